use zeroize::Zeroize;

use crate::error::{WicredError, WicredResult};

/// Capacity of a credential buffer (SSID or password), in bytes.
pub const CRED_SIZE: usize = 32;

/// The three mutable text fields exchanged with the client layer.
///
/// `hash` and `seed` are always hex. `salt` is base64 on the first Update
/// of a cycle (it carries the RSA-wrapped seed) and hex afterwards (it
/// carries the session proof). The same field name serves both roles, so
/// phase is tracked by the exchange state machine, never inferred from
/// the field's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportFields {
    pub hash: String,
    pub seed: String,
    pub salt: String,
}

impl TransportFields {
    pub fn new(hash: impl Into<String>, seed: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            seed: seed.into(),
            salt: salt.into(),
        }
    }
}

/// SSID and password buffers, fixed capacity, mutated in place by the
/// exchange. Wiped on drop.
///
/// The wire format derives lengths by trailing-zero trimming, so a value
/// with embedded or trailing zero bytes is silently corrupted in transit.
/// That limitation is inherited from the protocol and not corrected here.
#[derive(Clone)]
pub struct Credentials {
    ssid: [u8; CRED_SIZE],
    password: [u8; CRED_SIZE],
}

impl Credentials {
    pub fn new() -> Self {
        Self {
            ssid: [0u8; CRED_SIZE],
            password: [0u8; CRED_SIZE],
        }
    }

    /// Store an SSID. Fails if it exceeds the buffer capacity.
    pub fn set_ssid(&mut self, ssid: &[u8]) -> WicredResult<()> {
        store(&mut self.ssid, ssid, "ssid")
    }

    /// Store a password. Fails if it exceeds the buffer capacity.
    pub fn set_password(&mut self, password: &[u8]) -> WicredResult<()> {
        store(&mut self.password, password, "password")
    }

    pub fn ssid_buf(&self) -> &[u8; CRED_SIZE] {
        &self.ssid
    }

    pub fn password_buf(&self) -> &[u8; CRED_SIZE] {
        &self.password
    }

    pub fn ssid_buf_mut(&mut self) -> &mut [u8; CRED_SIZE] {
        &mut self.ssid
    }

    pub fn password_buf_mut(&mut self) -> &mut [u8; CRED_SIZE] {
        &mut self.password
    }

    /// SSID up to the first zero byte (the wire-format terminator).
    pub fn ssid(&self) -> &[u8] {
        trimmed(&self.ssid)
    }

    /// Password up to the first zero byte.
    pub fn password(&self) -> &[u8] {
        trimmed(&self.password)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.ssid.zeroize();
        self.password.zeroize();
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn store(buf: &mut [u8; CRED_SIZE], value: &[u8], what: &str) -> WicredResult<()> {
    if value.len() > CRED_SIZE {
        return Err(WicredError::Codec(format!(
            "{what} too long: {} bytes (capacity {CRED_SIZE})",
            value.len()
        )));
    }
    buf.zeroize();
    buf[..value.len()].copy_from_slice(value);
    Ok(())
}

fn trimmed(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}
