//! Challenge-handshake byte transforms: the junk-hash diversifier, the
//! device-identity key derivation, and the session-proof comparison.
//!
//! All three are preserved byte-for-byte from the deployed wire protocol.
//! None of them is a vetted cryptographic construction; see the notes on
//! each function before reusing it anywhere else.

use wicred_core::error::{WicredError, WicredResult};

use crate::DEVICE_KEY_SIZE;

/// Minimum number of positions the junk hash processes.
const JUNK_HASH_MIN: usize = 16;

/// Derivation constant for the device identity key.
const DEVICE_KEY_SALT: u8 = 0xA5;

/// Deterministic byte scrambler used to diversify keys and challenge
/// responses.
///
/// For each position `i` over at least 16 bytes (or the key's textual
/// length when longer, i.e. up to its first zero byte), the byte is
/// bit-inverted, nibble-swapped, XORed with `0xAA`, then squared-plus-
/// index modulo 256; a zero result remaps to `i + 1` so the output never
/// contains the trim sentinel. Positions past the end of `key` read as
/// zero.
///
/// This is a fixed diversification transform with no preimage or
/// collision resistance. It must never be treated as a secure hash; it
/// exists only because the deployed clients compute exactly this.
pub fn junk_hash(key: &[u8]) -> Vec<u8> {
    let textual = key.iter().position(|&b| b == 0).unwrap_or(key.len());
    let n = textual.max(JUNK_HASH_MIN);

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let mut b = key.get(i).copied().unwrap_or(0);
        b = !b;
        b = ((b & 0x0F) << 4) | ((b & 0xF0) >> 4);
        b ^= 0xAA;
        let v = b as usize + i;
        b = ((v * v) % 256) as u8;
        if b == 0 {
            b = (i + 1) as u8;
        }
        out.push(b);
    }
    out
}

/// Accessor for the device's hardware unique identifier, typically the
/// controller's 6-byte factory MAC.
pub trait HardwareId {
    fn unique_id(&self) -> WicredResult<Vec<u8>>;
}

/// Fixed hardware id, for hosts without eFuse access and for tests.
pub struct StaticHardwareId(pub Vec<u8>);

impl HardwareId for StaticHardwareId {
    fn unique_id(&self) -> WicredResult<Vec<u8>> {
        if self.0.is_empty() {
            return Err(WicredError::Hardware("empty hardware id".into()));
        }
        Ok(self.0.clone())
    }
}

/// Derive the 16-byte device identity key from the hardware unique id.
///
/// The id is cyclically repeated to 16 bytes and each byte XORed with
/// `0xA5 + index`; a zero result remaps to `index + 1` (zero is the trim
/// sentinel elsewhere and must never appear in a key).
pub fn derive_device_key(hw_id: &[u8]) -> WicredResult<[u8; DEVICE_KEY_SIZE]> {
    if hw_id.is_empty() {
        return Err(WicredError::Hardware("empty hardware id".into()));
    }
    let mut key = [0u8; DEVICE_KEY_SIZE];
    for (i, slot) in key.iter_mut().enumerate() {
        let mut b = hw_id[i % hw_id.len()] ^ (DEVICE_KEY_SALT + i as u8);
        if b == 0 {
            b = (i + 1) as u8;
        }
        *slot = b;
    }
    Ok(key)
}

/// Compare a presented session proof against the expected one.
///
/// Scans up to the shorter length: equal zero bytes at the same position
/// mean "both terminated, equal so far" and succeed immediately; any
/// mismatch fails. When lengths differ, equality requires the longer
/// side's byte at the shorter length to be zero.
///
/// Short-circuits on the first mismatch and is therefore not
/// constant-time. The timing side channel is part of the deployed
/// protocol's observable behavior; do not reuse this as a secure
/// equality check.
pub fn session_proof_equals(a: &[u8], b: &[u8]) -> bool {
    let limit = a.len().min(b.len());
    for i in 0..limit {
        if a[i] == 0 && b[i] == 0 {
            return true;
        }
        if a[i] != b[i] {
            return false;
        }
    }
    if a.len() > b.len() {
        return a[b.len()] == 0;
    }
    if a.len() < b.len() {
        return b[a.len()] == 0;
    }
    true
}
