//! AES-ECB transport encryption over fixed buffers.
//!
//! The wire format runs the block cipher with no IV and no chaining, one
//! independent 16-byte block at a time, over the trim-then-pad length of
//! both the data and the key (see [`crate::codec::padded_len`]). ECB
//! leaks equal-block structure; it is kept because the deployed clients
//! speak exactly this format.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use zeroize::Zeroize;

use wicred_core::error::{WicredError, WicredResult};

use crate::codec::padded_len;
use crate::BLOCK_SIZE;

enum EcbCipher {
    Aes128(Box<Aes128>),
    Aes256(Box<Aes256>),
}

impl EcbCipher {
    /// Key length follows the same trim-then-pad rule as the data: an
    /// all-zero key floors to 16 bytes (AES-128 with a zero key), and
    /// anything padding past 32 bytes is unsupported by the cipher.
    fn for_key(key: &[u8]) -> WicredResult<Self> {
        let klen = padded_len(key);
        let mut padded = [0u8; 32];
        for (i, slot) in padded.iter_mut().take(klen.min(32)).enumerate() {
            *slot = key.get(i).copied().unwrap_or(0);
        }
        let cipher = match klen {
            16 => Ok(Self::Aes128(Box::new(Aes128::new(GenericArray::from_slice(
                &padded[..16],
            ))))),
            32 => Ok(Self::Aes256(Box::new(Aes256::new(GenericArray::from_slice(
                &padded,
            ))))),
            other => Err(WicredError::Cipher(format!(
                "unsupported key length: {other} bytes (expected 16 or 32)"
            ))),
        };
        padded.zeroize();
        cipher
    }

    fn encrypt(&self, block: &mut [u8; BLOCK_SIZE]) {
        let ga = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(ga),
            Self::Aes256(c) => c.encrypt_block(ga),
        }
    }

    fn decrypt(&self, block: &mut [u8; BLOCK_SIZE]) {
        let ga = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.decrypt_block(ga),
            Self::Aes256(c) => c.decrypt_block(ga),
        }
    }
}

/// Encrypt `plain` under `key` into `out`, processing the trimmed and
/// padded length. Positions past the end of `plain` read as zero padding.
///
/// Returns the number of bytes written to `out`.
pub fn encrypt_blocks(plain: &[u8], key: &[u8], out: &mut [u8]) -> WicredResult<usize> {
    process(plain, key, out, Direction::Encrypt)
}

/// Decrypt `cipher` under `key` into `out`. Same length rule as
/// [`encrypt_blocks`]; a ciphertext with trailing zero bytes loses its
/// final blocks, which the producing side avoids by construction.
pub fn decrypt_blocks(cipher: &[u8], key: &[u8], out: &mut [u8]) -> WicredResult<usize> {
    process(cipher, key, out, Direction::Decrypt)
}

enum Direction {
    Encrypt,
    Decrypt,
}

fn process(data: &[u8], key: &[u8], out: &mut [u8], dir: Direction) -> WicredResult<usize> {
    let n = padded_len(data);
    if n > out.len() {
        return Err(WicredError::Cipher(format!(
            "output buffer too small: {} bytes for {n} processed",
            out.len()
        )));
    }
    let cipher = EcbCipher::for_key(key)?;

    for offset in (0..n).step_by(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        for (j, slot) in block.iter_mut().enumerate() {
            *slot = data.get(offset + j).copied().unwrap_or(0);
        }
        match dir {
            Direction::Encrypt => cipher.encrypt(&mut block),
            Direction::Decrypt => cipher.decrypt(&mut block),
        }
        out[offset..offset + BLOCK_SIZE].copy_from_slice(&block);
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key256() -> [u8; 32] {
        let mut k = [0u8; 32];
        for (i, slot) in k.iter_mut().enumerate() {
            *slot = (i as u8).wrapping_mul(7).wrapping_add(1);
        }
        k
    }

    #[test]
    fn test_roundtrip_aes256() {
        let key = key256();
        let mut plain = [0u8; 32];
        plain[..12].copy_from_slice(b"home-network");

        let mut ct = [0u8; 32];
        let n = encrypt_blocks(&plain, &key, &mut ct).unwrap();
        assert_eq!(n, 16, "12 semantic bytes process as one block");

        let mut back = [0u8; 32];
        decrypt_blocks(&ct[..n], &key, &mut back).unwrap();
        assert_eq!(&back[..12], &plain[..12]);
    }

    #[test]
    fn test_roundtrip_aes128() {
        let key = [0x42u8; 16];
        let plain = [0x33u8; 32];

        let mut ct = [0u8; 32];
        let n = encrypt_blocks(&plain, &key, &mut ct).unwrap();
        assert_eq!(n, 32);

        let mut back = [0u8; 32];
        decrypt_blocks(&ct, &key, &mut back).unwrap();
        assert_eq!(back, plain);
    }

    #[test]
    fn test_key_trim_selects_cipher_width() {
        // 20 semantic key bytes pad to 32: must encrypt like the
        // zero-extended 32-byte key, not like a truncated 16-byte one
        let mut short = [0u8; 20];
        short[..20].copy_from_slice(&[9u8; 20]);
        let mut extended = [0u8; 32];
        extended[..20].copy_from_slice(&short);

        let plain = [0x11u8; 16];
        let mut ct_short = [0u8; 16];
        let mut ct_extended = [0u8; 16];
        encrypt_blocks(&plain, &short, &mut ct_short).unwrap();
        encrypt_blocks(&plain, &extended, &mut ct_extended).unwrap();
        assert_eq!(ct_short, ct_extended);
    }

    #[test]
    fn test_all_zero_key_floors_to_aes128() {
        let plain = [0x55u8; 16];
        let mut ct_zero = [0u8; 16];
        encrypt_blocks(&plain, &[0u8; 32], &mut ct_zero).unwrap();

        let mut ct_128 = [0u8; 16];
        encrypt_blocks(&plain, &[0u8; 16], &mut ct_128).unwrap();
        assert_eq!(ct_zero, ct_128);
    }

    #[test]
    fn test_oversized_key_rejected() {
        let key = [1u8; 48];
        let mut out = [0u8; 16];
        let err = encrypt_blocks(&[1u8; 16], &key, &mut out).unwrap_err();
        assert!(matches!(err, WicredError::Cipher(_)));
    }

    #[test]
    fn test_output_too_small_rejected() {
        let mut out = [0u8; 16];
        let err = encrypt_blocks(&[1u8; 32], &key256(), &mut out).unwrap_err();
        assert!(matches!(err, WicredError::Cipher(_)));
    }

    #[test]
    fn test_all_zero_plaintext_processes_one_block() {
        let mut out = [0u8; 32];
        let n = encrypt_blocks(&[0u8; 32], &key256(), &mut out).unwrap();
        assert_eq!(n, 16);
    }

    #[test]
    fn test_ecb_blocks_are_independent() {
        let key = key256();
        let plain = [0xA7u8; 32]; // two identical blocks
        let mut ct = [0u8; 32];
        encrypt_blocks(&plain, &key, &mut ct).unwrap();
        assert_eq!(&ct[..16], &ct[16..], "ECB encrypts equal blocks equally");
    }

    proptest! {
        /// decrypt(encrypt(p, k)) == p whenever p has no semantic trailing
        /// zero byte and the ciphertext happens to keep its length
        #[test]
        fn roundtrip_without_trailing_zeros(
            mut plain in proptest::collection::vec(1u8..=255, 16..=32),
            key in proptest::array::uniform32(1u8..=255),
        ) {
            plain.resize(32, 0);
            let mut ct = [0u8; 32];
            let n = encrypt_blocks(&plain, &key, &mut ct).unwrap();

            // the trim rule can only bite if the ciphertext itself ends in
            // zeros; skip those cases, they are the documented lossy edge
            if n == 0 || ct[n - 1] == 0 {
                return Ok(());
            }

            let mut back = [0u8; 32];
            let m = decrypt_blocks(&ct[..n], &key, &mut back).unwrap();
            prop_assert_eq!(m, n);
            prop_assert_eq!(&back[..n], &plain[..n]);
        }
    }
}
