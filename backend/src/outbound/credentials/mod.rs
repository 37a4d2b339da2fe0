//! Argon2id implementation of the credential hashing port.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};

use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Hashes passwords with Argon2id and a fresh random salt per call.
///
/// Output is a PHC string, so the parameters travel with each stored hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHasherError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(CredentialHasherError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_verify_against_their_password() {
        let hasher = Argon2CredentialHasher;
        let hash = hasher.hash("s3cret!").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("s3cret!", &hash).expect("verify"));
        assert!(!hasher.verify("wrong", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_calls() {
        let hasher = Argon2CredentialHasher;
        let first = hasher.hash("same").expect("hash");
        let second = hasher.hash("same").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hashes_are_reported() {
        let err = Argon2CredentialHasher
            .verify("pw", "not-a-phc-string")
            .expect_err("malformed");
        assert!(matches!(err, CredentialHasherError::MalformedHash { .. }));
    }
}
