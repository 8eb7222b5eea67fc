use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::application::{AuthSession, CredentialService, UserRepository};
use crate::domain::validation::REQUIRED;
use crate::domain::{DomainError, FieldErrors};

pub const INVALID_CREDENTIALS: &str = "Wrong username or password.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialService>,
}

impl LoginUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>, credentials: Arc<dyn CredentialService>) -> Self {
        Self {
            user_repo,
            credentials,
        }
    }

    /// Checks the credentials and hands back the user's token, minting one
    /// if the account has none yet.
    pub async fn execute(&self, input: LoginInput) -> Result<AuthSession, DomainError> {
        let mut errors = FieldErrors::new();
        if input.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.add("username", REQUIRED);
        }
        if input.password.as_deref().map_or(true, str::is_empty) {
            errors.add("password", REQUIRED);
        }
        errors.into_result()?;

        let username = input.username.unwrap_or_default();
        let password = input.password.unwrap_or_default();

        let user = match self.user_repo.find_by_username(username.trim()).await? {
            Some(user) if self.credentials.verify_password(&password, user.password_hash()) => user,
            _ => {
                debug!("Failed login attempt for '{}'", username.trim());
                return Err(DomainError::invalid_input(INVALID_CREDENTIALS));
            }
        };

        let token = match self.user_repo.token_for(user.id()).await? {
            Some(token) => token,
            None => {
                let token = self.credentials.generate_token();
                self.user_repo.save_token(user.id(), &token).await?;
                token
            }
        };

        info!("User '{}' logged in", user.username());
        Ok(AuthSession::new(&user, token))
    }
}
