//! Salted SHA-256 password digests for extension access

use sha2::{Digest, Sha256};

/// Fresh random salt
pub fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hex digest of `salt:password`
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    constant_time_eq(
        hash_password(password, salt).as_bytes(),
        expected_hash.as_bytes(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("hunter2", "salt-a");
        let b = hash_password("hunter2", "salt-b");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_verify() {
        let salt = new_salt();
        let hash = hash_password("open sesame", &salt);
        assert!(verify_password("open sesame", &salt, &hash));
        assert!(!verify_password("open sesame!", &salt, &hash));
        assert!(!verify_password("open sesame", "other", &hash));
    }
}
