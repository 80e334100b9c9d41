//! Password hashing with PBKDF2-HMAC-SHA256.
//!
//! Stored format: `pbkdf2$<iterations>$<salt b64>$<hash b64>`. The
//! iteration count is read back from the stored string on verification, so
//! old hashes keep verifying if the default is raised later.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const ITERATIONS: u32 = 120_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut hash);

    format!(
        "pbkdf2${ITERATIONS}${}${}",
        BASE64.encode(salt),
        BASE64.encode(hash)
    )
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some("pbkdf2"), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt), BASE64.decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.len() != HASH_LEN {
        return false;
    }

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    // Length is fixed; compare without early exit on content.
    hash.iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let stored = hash_password("correct horse battery1");
        assert!(verify_password("correct horse battery1", &stored));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let stored = hash_password("correct horse battery1");
        assert!(!verify_password("wrong password entirely2", &stored));
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let a = hash_password("same password 1");
        let b = hash_password("same password 1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_value_rejected() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "plaintext"));
        assert!(!verify_password("anything", "pbkdf2$notanumber$AA$AA"));
    }
}
