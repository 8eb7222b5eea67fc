use crate::domain::DomainError;

/// Password hashing and token minting.
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String, DomainError>;

    fn verify_password(&self, password: &str, encoded: &str) -> bool;

    fn generate_token(&self) -> String;
}
