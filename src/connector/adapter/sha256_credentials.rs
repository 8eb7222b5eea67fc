use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::application::CredentialService;
use crate::domain::DomainError;

const SCHEME: &str = "pbkdf2_sha256";
pub const DEFAULT_ITERATIONS: u32 = 20_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const TOKEN_BYTES: usize = 20;

/// PBKDF2-HMAC-SHA256 password hashes encoded as
/// `pbkdf2_sha256$<iterations>$<salt>$<hex key>`.
pub struct Sha256Credentials {
    iterations: u32,
}

impl Sha256Credentials {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn derive(password: &str, salt: &str, iterations: u32) -> String {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
        hex(&key)
    }
}

impl Default for Sha256Credentials {
    fn default() -> Self {
        Self::new()
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl CredentialService for Sha256Credentials {
    fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        if password.is_empty() {
            return Err(DomainError::invalid_input("Password must not be empty"));
        }
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect();
        let key = Self::derive(password, &salt, self.iterations);
        Ok(format!("{}${}${}${}", SCHEME, self.iterations, salt, key))
    }

    fn verify_password(&self, password: &str, encoded: &str) -> bool {
        let parts: Vec<&str> = encoded.split('$').collect();
        let [scheme, iterations, salt, expected] = parts.as_slice() else {
            return false;
        };
        if *scheme != SCHEME {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let actual = Self::derive(password, salt, iterations.max(1));
        actual.as_bytes().ct_eq(expected.as_bytes()).into()
    }

    fn generate_token(&self) -> String {
        let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
        hex(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Sha256Credentials {
        Sha256Credentials::with_iterations(10)
    }

    #[test]
    fn test_hash_then_verify() {
        let creds = credentials();
        let encoded = creds.hash_password("s3cret!").unwrap();
        assert!(encoded.starts_with("pbkdf2_sha256$10$"));
        assert!(creds.verify_password("s3cret!", &encoded));
        assert!(!creds.verify_password("s3cret", &encoded));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let creds = credentials();
        let a = creds.hash_password("pw").unwrap();
        let b = creds.hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let creds = credentials();
        assert!(!creds.verify_password("pw", ""));
        assert!(!creds.verify_password("pw", "md5$1$salt$abc"));
        assert!(!creds.verify_password("pw", "pbkdf2_sha256$x$salt$abc"));
        assert!(!creds.verify_password("pw", "pbkdf2_sha256$1$salt$"));
    }

    #[test]
    fn test_derive_matches_pbkdf2_sha256_vector() {
        assert_eq!(
            Sha256Credentials::derive("password", "salt", 1),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_token_is_forty_hex_chars() {
        let token = credentials().generate_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, credentials().generate_token());
    }
}
