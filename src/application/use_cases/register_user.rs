use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::{CredentialService, ProfileRepository, UserRepository};
use crate::domain::validation::{is_valid_email, required_text, BLANK, REQUIRED};
use crate::domain::{DomainError, FieldErrors, NewUser, ProfileType, User};

const MAX_USERNAME_LEN: usize = 150;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub repeated_password: Option<String>,
    #[serde(rename = "type")]
    pub profile_type: Option<String>,
}

/// What a client receives after registering or logging in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: i64,
}

impl AuthSession {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            token,
            username: user.username().to_string(),
            email: user.email().to_string(),
            user_id: user.id(),
        }
    }
}

/// Passwords are checked for presence but never trimmed.
fn required_secret(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        Some(_) => {
            errors.add(field, BLANK);
            None
        }
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

struct ValidRegistration {
    username: String,
    email: String,
    password: String,
    profile_type: ProfileType,
}

pub struct RegisterUserUseCase {
    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    credentials: Arc<dyn CredentialService>,
}

impl RegisterUserUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            credentials,
        }
    }

    pub async fn execute(&self, input: RegistrationInput) -> Result<AuthSession, DomainError> {
        self.register(input, false).await
    }

    /// Registers an administrative account; used by the CLI only.
    pub async fn create_staff(&self, input: RegistrationInput) -> Result<AuthSession, DomainError> {
        self.register(input, true).await
    }

    async fn register(&self, input: RegistrationInput, is_staff: bool) -> Result<AuthSession, DomainError> {
        let valid = self.validate(input).await?;

        let token = self.credentials.generate_token();
        let new_user = NewUser {
            username: valid.username,
            email: valid.email,
            password_hash: self.credentials.hash_password(&valid.password)?,
            is_staff,
            profile_type: valid.profile_type,
            token: token.clone(),
        };

        let user = self.user_repo.create(new_user).await?;
        info!(
            "Registered {} user '{}' ({}){}",
            valid.profile_type,
            user.username(),
            user.id(),
            if is_staff { " with staff rights" } else { "" }
        );

        Ok(AuthSession::new(&user, token))
    }

    async fn validate(&self, input: RegistrationInput) -> Result<ValidRegistration, DomainError> {
        let mut errors = FieldErrors::new();

        let username = required_text(&mut errors, "username", input.username.as_deref());
        let email = required_text(&mut errors, "email", input.email.as_deref());
        let password = required_secret(&mut errors, "password", input.password);
        let repeated = required_secret(&mut errors, "repeated_password", input.repeated_password);
        let profile_type = match input.profile_type.as_deref() {
            None => {
                errors.add("type", REQUIRED);
                None
            }
            Some(raw) => {
                let parsed = ProfileType::parse(raw);
                if parsed.is_none() {
                    errors.add("type", format!("\"{}\" is not a valid choice (customer, business).", raw));
                }
                parsed
            }
        };

        if let Some(name) = &username {
            if name.len() > MAX_USERNAME_LEN {
                errors.add("username", "Ensure this field has no more than 150 characters.");
            } else if !name.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
                errors.add(
                    "username",
                    "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            } else if self.user_repo.username_exists(name).await? {
                errors.add("username", "A user with that username already exists.");
            }
        }

        if let Some(address) = &email {
            if !is_valid_email(address) {
                errors.add("email", "Enter a valid email address.");
            } else if self.profile_repo.email_taken(address, None).await? {
                errors.add("email", "A user with that email already exists.");
            }
        }

        if let (Some(p), Some(r)) = (&password, &repeated) {
            if p != r {
                errors.add("repeated_password", "Passwords do not match.");
            }
        }

        errors.into_result()?;

        match (username, email, password, profile_type) {
            (Some(username), Some(email), Some(password), Some(profile_type)) => Ok(ValidRegistration {
                username,
                email,
                password,
                profile_type,
            }),
            _ => Err(DomainError::internal("registration passed validation with missing fields")),
        }
    }
}
