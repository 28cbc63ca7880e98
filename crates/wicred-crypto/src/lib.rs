//! wicred-crypto: secure WiFi credential exchange for embedded controllers
//!
//! A local client provisions WiFi credentials onto the controller without
//! ever sending them in the clear, and reads them back only after proving
//! possession of the session secret it delivered.
//!
//! Key flow:
//! ```text
//! Firmware Key (client-generated, RSA-2048/OAEP-wrapped, decrypted on device)
//!   ├── Challenge       (32 bytes, AES-ECB decrypted under the firmware key)
//!   ├── Pseudo Key      (junk-hash of the firmware key; proof encryption only)
//!   └── Credential AES  (SSID/password transport encryption)
//! Device Identity Key (16 bytes, derived from the hardware unique id)
//!   └── Credential AES  (at-rest re-encryption after a verified Get)
//! ```
//!
//! Two-phase protocol driven by [`CredentialExchange`]:
//! Update issues a fresh session proof and re-encrypts the stored
//! credentials for transport; Get validates the proof and rebinds the
//! client-supplied credentials to the device. Wire lengths follow the
//! trim-then-pad rule: trailing zero bytes are stripped, then the length
//! is rounded up to a whole number of 16-byte blocks.

pub mod block;
pub mod codec;
pub mod exchange;
pub mod keys;
pub mod scramble;

pub use exchange::{CredentialExchange, SessionState};
pub use keys::{FirmwareKey, KeyManager, NoopWatchdog, Watchdog};
pub use scramble::{
    derive_device_key, junk_hash, session_proof_equals, HardwareId, StaticHardwareId,
};

/// AES block size; all wire buffers are processed in whole blocks.
pub const BLOCK_SIZE: usize = 16;

/// Size of the session challenge and of the handshake proof.
pub const CHALLENGE_SIZE: usize = 32;

/// Size of the pseudo key derived from the firmware key.
pub const PSEUDO_KEY_SIZE: usize = 32;

/// Size of the device identity key derived from the hardware id.
pub const DEVICE_KEY_SIZE: usize = 16;

/// Capacity of the wrapped-seed buffer (one RSA-2048 block).
pub const SEED_CAPACITY: usize = 256;

/// RSA modulus size for the persisted keypair.
pub const RSA_KEY_BITS: usize = 2048;
