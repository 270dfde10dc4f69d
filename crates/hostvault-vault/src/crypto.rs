// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fernet token seal/open (AES-128-CBC + HMAC-SHA256).
//!
//! Token layout before base64:
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | IV (16) | ciphertext (PKCS#7, n*16) | HMAC-SHA256 (32)
//! ```
//!
//! The HMAC covers every byte before it. Every call to [`seal`] draws a fresh
//! IV from the system CSPRNG. The token is URL-safe base64 with padding.

use aes::Aes128;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use hostvault_core::HostvaultError;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::VaultKey;

const VERSION: u8 = 0x80;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const HMAC_LEN: usize = 32;
const HEADER_LEN: usize = 1 + 8 + IV_LEN;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Encrypt `plaintext` into a Fernet token stamped with the current time.
pub fn seal(key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>, HostvaultError> {
    let mut iv = [0u8; IV_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| HostvaultError::Vault("failed to generate random IV".to_string()))?;
    let timestamp = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
    seal_with(key, plaintext, timestamp, iv)
}

fn seal_with(
    key: &VaultKey,
    plaintext: &[u8],
    timestamp: u64,
    iv: [u8; IV_LEN],
) -> Result<Vec<u8>, HostvaultError> {
    let ciphertext = Aes128CbcEnc::new_from_slices(key.encryption_key(), &iv)
        .map_err(|_| HostvaultError::Vault("invalid AES-128 key length".to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
    token.push(VERSION);
    token.extend_from_slice(&timestamp.to_be_bytes());
    token.extend_from_slice(&iv);
    token.extend_from_slice(&ciphertext);

    let tag = hmac::sign(&signing_key(key), &token);
    token.extend_from_slice(tag.as_ref());

    Ok(URL_SAFE.encode(&token).into_bytes())
}

/// Verify and decrypt a Fernet token.
///
/// Every failure (bad encoding, unknown version, truncation, wrong key,
/// tampering, bad padding) yields the same error so callers cannot tell
/// them apart.
pub fn open(key: &VaultKey, token: &[u8]) -> Result<Zeroizing<Vec<u8>>, HostvaultError> {
    let raw = URL_SAFE.decode(token.trim_ascii()).map_err(|_| invalid_token())?;

    if raw.len() < HEADER_LEN + BLOCK_LEN + HMAC_LEN || raw[0] != VERSION {
        return Err(invalid_token());
    }
    let (signed, tag) = raw.split_at(raw.len() - HMAC_LEN);
    hmac::verify(&signing_key(key), signed, tag).map_err(|_| invalid_token())?;

    let (header, ciphertext) = signed.split_at(HEADER_LEN);
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(invalid_token());
    }
    let iv = &header[1 + 8..];

    Aes128CbcDec::new_from_slices(key.encryption_key(), iv)
        .map_err(|_| invalid_token())?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| invalid_token())
}

fn signing_key(key: &VaultKey) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, key.signing_key())
}

fn invalid_token() -> HostvaultError {
    HostvaultError::Vault("invalid token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Published Fernet test vector: "hello" sealed at 1985-10-26T08:20:00Z
    // with IV 00 01 .. 0f.
    const VECTOR_KEY: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";
    const VECTOR_TOKEN: &str = "gAAAAAAdwJ6wAAECAwQFBgcICQoLDA0ODy021cpGVWKZ_eEwCGM4BLLF_5CV9dOPmrhuVUPgJobwOz7JcbmrR64jVmpU4IwqDA==";
    const VECTOR_TIMESTAMP: u64 = 499_162_800;

    fn key(byte: u8) -> VaultKey {
        VaultKey::from_bytes([byte; 32])
    }

    fn token_timestamp(token: &[u8]) -> Option<u64> {
        let raw = URL_SAFE.decode(token.trim_ascii()).ok()?;
        let stamp: [u8; 8] = raw.get(1..9)?.try_into().ok()?;
        Some(u64::from_be_bytes(stamp))
    }

    fn counting_iv() -> [u8; IV_LEN] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn opens_published_vector() {
        let k = VaultKey::from_base64(VECTOR_KEY).unwrap();
        assert_eq!(open(&k, VECTOR_TOKEN.as_bytes()).unwrap().as_slice(), b"hello");
        assert_eq!(token_timestamp(VECTOR_TOKEN.as_bytes()), Some(VECTOR_TIMESTAMP));
    }

    #[test]
    fn seals_published_vector_byte_for_byte() {
        let k = VaultKey::from_base64(VECTOR_KEY).unwrap();
        let token = seal_with(&k, b"hello", VECTOR_TIMESTAMP, counting_iv()).unwrap();
        assert_eq!(String::from_utf8(token).unwrap(), VECTOR_TOKEN);
    }

    #[test]
    fn seal_open_roundtrip() {
        let k = key(1);
        let token = seal(&k, b"TTP_MASTER_VERIFY").unwrap();
        assert_eq!(open(&k, &token).unwrap().as_slice(), b"TTP_MASTER_VERIFY");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let k = key(2);
        let token = seal(&k, b"").unwrap();
        assert!(open(&k, &token).unwrap().is_empty());
    }

    #[test]
    fn seal_produces_different_tokens_for_same_plaintext() {
        let k = key(3);
        assert_ne!(seal(&k, b"same").unwrap(), seal(&k, b"same").unwrap());
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let token = seal(&key(4), b"secret").unwrap();
        assert!(open(&key(5), &token).is_err());
    }

    #[test]
    fn token_layout_is_fernet() {
        let iv = [9u8; IV_LEN];
        let token = seal_with(&key(6), b"0123456789abcdef!", 1_700_000_000, iv).unwrap();
        let raw = URL_SAFE.decode(&token).unwrap();

        assert_eq!(raw[0], 0x80);
        assert_eq!(&raw[1..9], &1_700_000_000u64.to_be_bytes());
        assert_eq!(&raw[9..25], &iv);
        // 17 bytes pad to two blocks.
        assert_eq!(raw.len(), HEADER_LEN + 32 + HMAC_LEN);
        assert_eq!(token_timestamp(&token), Some(1_700_000_000));
        assert!(token.iter().all(|b| b.is_ascii()));
    }

    #[test]
    fn header_encodes_like_other_fernet_tokens() {
        // Every Fernet token starts with "gAAAAA" while the timestamp fits
        // in 40 bits.
        let k = VaultKey::from_bytes(std::array::from_fn(|i| i as u8));
        let token = seal_with(&k, b"hello", 0, counting_iv()).unwrap();
        assert_eq!(open(&k, &token).unwrap().as_slice(), b"hello");
        assert!(token.starts_with(b"gAAAAAAAAAAAAAECAwQFBgcICQoLDA0O"));
        assert!(seal(&k, b"hello").unwrap().starts_with(b"gAAAAA"));
    }

    #[test]
    fn rejects_bad_version_and_truncation() {
        let k = key(7);
        let token = seal(&k, b"payload").unwrap();
        let mut raw = URL_SAFE.decode(&token).unwrap();

        raw[0] = 0x81;
        assert!(open(&k, URL_SAFE.encode(&raw).as_bytes()).is_err());

        raw[0] = VERSION;
        raw.truncate(HEADER_LEN + HMAC_LEN);
        assert!(open(&k, URL_SAFE.encode(&raw).as_bytes()).is_err());

        assert!(open(&k, b"not base64 at all!").is_err());
        assert!(open(&k, b"").is_err());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let k = key(8);
        let mut token = seal(&k, b"x").unwrap();
        token.push(b'\n');
        assert_eq!(open(&k, &token).unwrap().as_slice(), b"x");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_single_bit_flip_is_rejected(bit in 0usize..(HEADER_LEN + 32 + HMAC_LEN) * 8) {
            let k = key(10);
            let token = seal(&k, b"0123456789abcdef!").unwrap();
            let mut raw = URL_SAFE.decode(&token).unwrap();
            raw[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(open(&k, URL_SAFE.encode(&raw).as_bytes()).is_err());
        }
    }
}
