// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the master password.
//!
//! The 32 derived bytes are used directly as a Fernet key: the first half
//! signs, the second half encrypts.

use std::fmt;
use std::num::NonZeroU32;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use hostvault_core::HostvaultError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count for every on-disk vault.
///
/// The master record does not store a cost, so this is fixed: a vault set
/// up at one count cannot be unlocked at another.
pub const KDF_ITERATIONS: u32 = 480_000;

/// Symmetric key material derived from the master password.
///
/// Zeroed on drop. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultKey(Zeroizing<[u8; KEY_LEN]>);

impl VaultKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// HMAC-SHA256 signing half.
    pub fn signing_key(&self) -> &[u8] {
        &self.0[..16]
    }

    /// AES-128 encryption half.
    pub fn encryption_key(&self) -> &[u8] {
        &self.0[16..]
    }

    /// URL-safe base64 text form, as used by other Fernet implementations.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(&self.0[..]))
    }

    pub fn from_base64(text: &str) -> Result<Self, HostvaultError> {
        let decoded = Zeroizing::new(
            URL_SAFE
                .decode(text.trim())
                .map_err(|_| HostvaultError::Vault("key is not valid base64".to_string()))?,
        );
        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            HostvaultError::Vault(format!("key must decode to {KEY_LEN} bytes"))
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}

/// Derive a key from `password` and `salt`.
///
/// Deterministic for a given `(password, salt, iterations)`. Rejects a
/// password that is not UTF-8, a salt that is not exactly [`SALT_LEN`]
/// bytes, and a zero iteration count, before any hashing happens.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<VaultKey, HostvaultError> {
    std::str::from_utf8(password)
        .map_err(|_| HostvaultError::Vault("master password is not valid UTF-8".to_string()))?;
    if salt.len() != SALT_LEN {
        return Err(HostvaultError::Vault(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| HostvaultError::Vault("KDF iterations must be non-zero".to_string()))?;

    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        out.as_mut(),
    );
    Ok(VaultKey(out))
}

/// Generate a random 16-byte salt from the system CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN], HostvaultError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| HostvaultError::Vault("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Low cost for fast tests.
    const ITERATIONS: u32 = 1_000;

    #[test]
    fn derive_key_produces_consistent_output() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_key(b"test password", &salt, ITERATIONS).unwrap();
        let key2 = derive_key(b"test password", &salt, ITERATIONS).unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn different_password_or_salt_changes_key() {
        let base = derive_key(b"one", &[1u8; SALT_LEN], ITERATIONS).unwrap();
        let other_pw = derive_key(b"two", &[1u8; SALT_LEN], ITERATIONS).unwrap();
        let other_salt = derive_key(b"one", &[2u8; SALT_LEN], ITERATIONS).unwrap();
        assert_ne!(base, other_pw);
        assert_ne!(base, other_salt);
    }

    #[test]
    fn matches_pbkdf2_reference_vector() {
        // RFC 7914 section 11: PBKDF2-HMAC-SHA256("passwd", "salt", c=1, dkLen=64).
        // Our salt must be 16 bytes, so check the primitive directly.
        let mut out = [0u8; 32];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(1).unwrap(),
            b"salt",
            b"passwd",
            &mut out,
        );
        assert_eq!(
            hex::encode(out),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn production_cost_matches_existing_vaults() {
        // hashlib.pbkdf2_hmac("sha256", b"Secret1!", bytes(range(16)), 480000)
        let salt: [u8; SALT_LEN] = std::array::from_fn(|i| i as u8);
        let key = derive_key(b"Secret1!", &salt, KDF_ITERATIONS).unwrap();
        assert_eq!(
            key.to_base64().as_str(),
            "VVn5Utm-YnispteSMkLIgqGCFzHIj6I1_U02AuE1e-s="
        );
    }

    #[test]
    fn rejects_non_utf8_password() {
        let result = derive_key(&[0xff, 0xfe, 0x00], &[0u8; SALT_LEN], ITERATIONS);
        assert!(matches!(result, Err(HostvaultError::Vault(_))));
    }

    #[test]
    fn rejects_wrong_salt_length() {
        assert!(derive_key(b"pw", &[0u8; 15], ITERATIONS).is_err());
        assert!(derive_key(b"pw", &[0u8; 32], ITERATIONS).is_err());
    }

    #[test]
    fn rejects_zero_iterations() {
        assert!(derive_key(b"pw", &[0u8; SALT_LEN], 0).is_err());
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[test]
    fn base64_text_form_round_trips() {
        let key = derive_key(b"pw", &[7u8; SALT_LEN], ITERATIONS).unwrap();
        let text = key.to_base64();
        assert_eq!(text.len(), 44);
        assert_eq!(VaultKey::from_base64(&text).unwrap(), key);
        assert!(VaultKey::from_base64("c2hvcnQ=").is_err());
    }

    #[test]
    fn debug_does_not_leak_key_bytes() {
        let key = VaultKey::from_bytes([0xab; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "VaultKey([REDACTED])");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn derivation_is_deterministic(password in ".{0,24}", salt in any::<[u8; SALT_LEN]>()) {
            let a = derive_key(password.as_bytes(), &salt, 10).unwrap();
            let b = derive_key(password.as_bytes(), &salt, 10).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
