use std::sync::Arc;

use crate::application::UserRepository;
use crate::domain::{DomainError, User};

/// Resolves an auth token to its user.
pub struct AuthenticateUserUseCase {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthenticateUserUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, token: &str) -> Result<User, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::unauthenticated("Authentication credentials were not provided."));
        }

        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| DomainError::unauthenticated("Invalid token."))
    }
}
