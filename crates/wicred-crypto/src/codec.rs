//! Hex and base64 transcoding at the wire boundary, plus the
//! trim-then-pad length rule shared with the block cipher layer.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use wicred_core::error::{WicredError, WicredResult};

use crate::BLOCK_SIZE;

/// Semantic length of a wire buffer: trailing zero bytes are stripped,
/// the remainder is rounded up to a whole number of 16-byte blocks, and
/// an all-zero buffer floors to one block, never zero.
///
/// Zero bytes are the wire format's trim sentinel, so a value that
/// legitimately ends in zero bytes is shortened in transit. Documented
/// limitation of the protocol; callers must not store such values.
pub fn padded_len(buf: &[u8]) -> usize {
    let mut n = buf.len();
    while n > 0 && buf[n - 1] == 0 {
        n -= 1;
    }
    if n == 0 {
        BLOCK_SIZE
    } else {
        (n + BLOCK_SIZE - 1) & !(BLOCK_SIZE - 1)
    }
}

/// Render the semantic length of `buf` as lowercase hex, two digits per
/// byte. Positions past the end of `buf` (the rounding can overshoot a
/// buffer that is not block-aligned) read as zero.
pub fn bytes_to_hex(buf: &[u8]) -> String {
    let n = padded_len(buf);
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        let b = buf.get(i).copied().unwrap_or(0);
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// Parse two hex characters per output byte into `out`, no trimming,
/// capped at the output capacity. A trailing odd character is ignored,
/// matching the wire producer which always emits whole bytes.
///
/// Returns the number of bytes written.
pub fn hex_to_bytes(hex: &str, out: &mut [u8]) -> WicredResult<usize> {
    if !hex.is_ascii() {
        return Err(WicredError::Codec("non-ASCII hex input".into()));
    }
    let n = (hex.len() / 2).min(out.len());
    for (i, slot) in out.iter_mut().take(n).enumerate() {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| WicredError::Codec(format!("invalid hex at byte {i}: {e}")))?;
    }
    Ok(n)
}

/// Decode standard base64 into `out`, capped at the output capacity.
///
/// Returns the number of bytes written.
pub fn base64_decode(text: &str, out: &mut [u8]) -> WicredResult<usize> {
    BASE64
        .decode_slice(text.as_bytes(), out)
        .map_err(|e| WicredError::Codec(format!("base64 decode: {e}")))
}
