//! The two-phase credential exchange.
//!
//! Update (device → client): unwrap the client's session seed, recover
//! the challenge it issued, publish a proof of correct decryption, and
//! re-encrypt the stored credentials for transport.
//!
//! Get (client → device): verify the client echoed the proof, decrypt
//! the client-supplied credentials, rebind them to the device identity
//! key, and close the round with a response encrypted under the firmware
//! key.
//!
//! Session state lives in an explicit [`Session`] value owned by the
//! exchange; `&mut self` entry points make the one-in-flight-session
//! rule a compile-time property. Callers sharing an exchange across
//! tasks must serialize access themselves.

use tracing::{debug, info, warn};
use zeroize::Zeroize;

use wicred_core::error::{WicredError, WicredResult};
use wicred_core::types::{Credentials, TransportFields, CRED_SIZE};

use crate::keys::{FirmwareKey, KeyManager};
use crate::scramble::{derive_device_key, junk_hash, session_proof_equals, HardwareId};
use crate::{block, codec, CHALLENGE_SIZE, PSEUDO_KEY_SIZE, SEED_CAPACITY};

/// Protocol phase. `salt` is a base64 wrapped seed entering Update and a
/// hex session proof everywhere after, so phase is tracked here rather
/// than inferred from field content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session material present.
    Idle,
    /// Update succeeded; a proof is outstanding.
    ChallengeIssued,
    /// Get verified the proof; credentials were rebound.
    Verified,
    /// Proof verification failed; terminal until the next Update.
    Expired,
}

/// Per-session key material, overwritten by each Update.
struct Session {
    state: SessionState,
    fw_key: FirmwareKey,
    challenge: [u8; CHALLENGE_SIZE],
    pseudo_key: [u8; PSEUDO_KEY_SIZE],
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            fw_key: FirmwareKey::empty(),
            challenge: [0u8; CHALLENGE_SIZE],
            pseudo_key: [0u8; PSEUDO_KEY_SIZE],
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.fw_key = FirmwareKey::empty();
        self.challenge.zeroize();
        self.pseudo_key.zeroize();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.challenge.zeroize();
        self.pseudo_key.zeroize();
    }
}

/// Orchestrates the exchange: drives [`KeyManager`] once per boot and the
/// codec/cipher/scramble layers once per round.
pub struct CredentialExchange {
    keys: KeyManager,
    hardware: Box<dyn HardwareId + Send + Sync>,
    session: Session,
}

impl CredentialExchange {
    pub fn new(keys: KeyManager, hardware: Box<dyn HardwareId + Send + Sync>) -> Self {
        Self {
            keys,
            hardware,
            session: Session::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Provision the persisted keypair. Run once at boot, before the
    /// first Update; long-running on first boot (see [`KeyManager`]).
    pub fn ensure_keys(&mut self) -> WicredResult<()> {
        self.keys.generate_keys()
    }

    /// Phase one. `fields.salt` carries the base64 RSA-wrapped seed and
    /// `fields.seed` the hex ciphertext of the 32-byte challenge. On
    /// success all three fields are rewritten in hex: `salt` becomes the
    /// session proof, `hash` the SSID encrypted under the firmware key,
    /// `seed` the junk-hashed password encrypted under the pseudo key.
    pub fn update(&mut self, fields: &mut TransportFields, creds: &Credentials) -> WicredResult<()> {
        self.session.reset();

        let mut wrapped = [0u8; SEED_CAPACITY];
        let wrapped_len = codec::base64_decode(&fields.salt, &mut wrapped)?;
        let fw_key = self.keys.decrypt_seed(&wrapped[..wrapped_len])?;

        let mut challenge_ct = [0u8; CHALLENGE_SIZE];
        codec::hex_to_bytes(&fields.seed, &mut challenge_ct)?;
        let mut challenge = [0u8; CHALLENGE_SIZE];
        block::decrypt_blocks(&challenge_ct, fw_key.cipher_key(), &mut challenge)?;

        let pseudo_key = pseudo_key_from(&fw_key);
        let response = junk_hash(&challenge);
        let mut proof = [0u8; CHALLENGE_SIZE];
        block::encrypt_blocks(&response, &pseudo_key, &mut proof)?;
        fields.salt = codec::bytes_to_hex(&proof);

        let mut enc_ssid = [0u8; CRED_SIZE];
        block::encrypt_blocks(creds.ssid_buf(), fw_key.cipher_key(), &mut enc_ssid)?;
        fields.hash = codec::bytes_to_hex(&enc_ssid);

        let pwd_hash = junk_hash(creds.password_buf());
        let mut enc_pass = [0u8; CRED_SIZE];
        block::encrypt_blocks(&pwd_hash, &pseudo_key, &mut enc_pass)?;
        fields.seed = codec::bytes_to_hex(&enc_pass);

        self.session.fw_key = fw_key;
        self.session.challenge = challenge;
        self.session.pseudo_key = pseudo_key;
        self.session.state = SessionState::ChallengeIssued;
        debug!("session challenge issued");
        Ok(())
    }

    /// Phase two. `fields.salt` must echo the proof issued by Update;
    /// `fields.hash`/`fields.seed` carry the client-encrypted SSID and
    /// password (firmware key, hex). On a verified proof the credentials
    /// are decrypted in place, re-encrypted under the device identity
    /// key into `hash`/`seed`, and `salt` becomes the closing response.
    ///
    /// A failed proof leaves `fields` and `creds` untouched and expires
    /// the session; the client restarts with a fresh Update.
    pub fn get(&mut self, fields: &mut TransportFields, creds: &mut Credentials) -> WicredResult<()> {
        if self.session.state != SessionState::ChallengeIssued {
            return Err(WicredError::InvalidState("no challenge outstanding"));
        }

        let mut presented = [0u8; CHALLENGE_SIZE];
        codec::hex_to_bytes(&fields.salt, &mut presented)?;
        let mut expected = [0u8; CHALLENGE_SIZE];
        block::encrypt_blocks(
            &self.session.challenge,
            &self.session.pseudo_key,
            &mut expected,
        )?;

        if !session_proof_equals(&presented, &expected) {
            self.session.state = SessionState::Expired;
            warn!("session expired");
            return Err(WicredError::SessionExpired);
        }

        // fields shorter than 32 hex chars carry no credential; the
        // stored value for that slot is kept as-is
        if fields.hash.len() > 31 {
            let mut enc = [0u8; CRED_SIZE];
            codec::hex_to_bytes(&fields.hash, &mut enc)?;
            let buf = creds.ssid_buf_mut();
            buf.zeroize();
            block::decrypt_blocks(&enc, self.session.fw_key.cipher_key(), buf)?;
        }
        if fields.seed.len() > 31 {
            let mut enc = [0u8; CRED_SIZE];
            codec::hex_to_bytes(&fields.seed, &mut enc)?;
            let buf = creds.password_buf_mut();
            buf.zeroize();
            block::decrypt_blocks(&enc, self.session.fw_key.cipher_key(), buf)?;
        }

        let device_key = derive_device_key(&self.hardware.unique_id()?)?;
        let mut enc_ssid = [0u8; CRED_SIZE];
        block::encrypt_blocks(creds.ssid_buf(), &device_key, &mut enc_ssid)?;
        let mut enc_pass = [0u8; CRED_SIZE];
        block::encrypt_blocks(creds.password_buf(), &device_key, &mut enc_pass)?;

        let response = junk_hash(&self.session.challenge);
        let mut closing = [0u8; CHALLENGE_SIZE];
        block::encrypt_blocks(&response, self.session.fw_key.cipher_key(), &mut closing)?;

        fields.hash = codec::bytes_to_hex(&enc_ssid);
        fields.seed = codec::bytes_to_hex(&enc_pass);
        fields.salt = codec::bytes_to_hex(&closing);

        self.session.state = SessionState::Verified;
        info!("wifi credentials changed");
        Ok(())
    }
}

/// The pseudo key: junk-hash of the firmware key, truncated or
/// zero-padded to 32 bytes. Used only to encrypt and verify the
/// handshake proof, never to protect credentials directly.
fn pseudo_key_from(fw_key: &FirmwareKey) -> [u8; PSEUDO_KEY_SIZE] {
    let mut scrambled = junk_hash(fw_key.as_bytes());
    let mut key = [0u8; PSEUDO_KEY_SIZE];
    let n = scrambled.len().min(PSEUDO_KEY_SIZE);
    key[..n].copy_from_slice(&scrambled[..n]);
    scrambled.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble::StaticHardwareId;
    use wicred_core::config::KeyStoreConfig;

    fn exchange_without_keys() -> CredentialExchange {
        let dir = std::env::temp_dir();
        let config = KeyStoreConfig {
            private_key: dir.join("wicred-test-missing-private.pem"),
            public_key: dir.join("wicred-test-missing-public.pem"),
        };
        CredentialExchange::new(
            KeyManager::new(&config),
            Box::new(StaticHardwareId(vec![0x24, 0x6F, 0x28])),
        )
    }

    #[test]
    fn test_get_without_challenge_is_state_error() {
        let mut ex = exchange_without_keys();
        let mut fields = TransportFields::default();
        let mut creds = Credentials::new();

        let err = ex.get(&mut fields, &mut creds).unwrap_err();
        assert!(matches!(err, WicredError::InvalidState(_)));
        assert_eq!(ex.state(), SessionState::Idle);
    }

    #[test]
    fn test_update_with_undecodable_salt_keeps_idle_state() {
        let mut ex = exchange_without_keys();
        let mut fields = TransportFields::new("", "", "!!!not-base64!!!");
        let creds = Credentials::new();

        assert!(ex.update(&mut fields, &creds).is_err());
        assert_eq!(ex.state(), SessionState::Idle);
        assert_eq!(fields.salt, "!!!not-base64!!!", "fields untouched on failure");
    }
}
