use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;

use crate::application::ProfileRepository;
use crate::domain::validation::{is_valid_email, optional_text};
use crate::domain::{DomainError, FieldErrors, Profile, ProfileChanges, ProfileType, User};

use super::permissions::ensure_owner;

/// Keys a client may send when patching a profile.
pub const EDITABLE_PROFILE_FIELDS: [&str; 8] = [
    "first_name",
    "last_name",
    "email",
    "location",
    "description",
    "working_hours",
    "tel",
    "file",
];

pub struct ManageProfilesUseCase {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ManageProfilesUseCase {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    pub async fn get(&self, user_id: i64) -> Result<Profile, DomainError> {
        self.profile_repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No profile for user {}", user_id)))
    }

    pub async fn list(&self, profile_type: ProfileType) -> Result<Vec<Profile>, DomainError> {
        self.profile_repo.list_by_type(profile_type).await
    }

    /// Applies a partial update sent as a raw JSON object. Only the owner
    /// may edit; unknown keys are rejected as a whole.
    pub async fn update(
        &self,
        caller: &User,
        user_id: i64,
        fields: Map<String, Value>,
    ) -> Result<Profile, DomainError> {
        let mut profile = self.get(user_id).await?;
        ensure_owner(caller, profile.user_id, "You can only edit your own profile.")?;

        let unknown: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|k| !EDITABLE_PROFILE_FIELDS.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(DomainError::invalid_input(format!(
                "The field(s) {} cannot be updated. Allowed fields: {}.",
                unknown.join(", "),
                EDITABLE_PROFILE_FIELDS.join(", ")
            )));
        }

        let changes = self.validate(&fields, profile.user_id).await?;
        profile.apply(changes, Utc::now());
        self.profile_repo.update(&profile).await?;

        info!("Updated profile of user {}", profile.user_id);
        Ok(profile)
    }

    async fn validate(&self, fields: &Map<String, Value>, user_id: i64) -> Result<ProfileChanges, DomainError> {
        let mut errors = FieldErrors::new();
        let mut text = |name: &str, allow_blank: bool| -> Option<String> {
            match fields.get(name) {
                None => None,
                Some(Value::String(s)) if allow_blank => Some(s.trim().to_string()),
                Some(Value::String(s)) => optional_text(&mut errors, name, Some(s)),
                Some(Value::Null) if allow_blank => Some(String::new()),
                Some(_) => {
                    errors.add(name, "Not a valid string.");
                    None
                }
            }
        };

        let mut changes = ProfileChanges {
            first_name: text("first_name", false),
            last_name: text("last_name", false),
            email: text("email", false),
            location: text("location", false),
            description: text("description", true),
            working_hours: text("working_hours", false),
            tel: text("tel", false),
            file: text("file", true),
        };

        if let Some(email) = changes.email.take() {
            if !is_valid_email(&email) {
                errors.add("email", "Enter a valid email address.");
            } else if self.profile_repo.email_taken(&email, Some(user_id)).await? {
                errors.add("email", "A user with that email already exists.");
            } else {
                changes.email = Some(email);
            }
        }

        errors.into_result()?;
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::RegistrationInput;
    use crate::connector::{Container, ContainerConfig};

    async fn container() -> Container {
        Container::new(ContainerConfig::in_memory().with_password_iterations(1))
            .await
            .unwrap()
    }

    async fn register(container: &Container, name: &str) -> User {
        let session = container
            .register_use_case()
            .execute(RegistrationInput {
                username: Some(name.to_string()),
                email: Some(format!("{}@example.com", name)),
                password: Some("pw".to_string()),
                repeated_password: Some("pw".to_string()),
                profile_type: Some("customer".to_string()),
            })
            .await
            .unwrap();
        container.authenticate_use_case().execute(&session.token).await.unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_owner_updates_text_fields() {
        let container = container().await;
        let anna = register(&container, "anna").await;

        let profile = container
            .profiles_use_case()
            .update(&anna, anna.id(), fields(json!({"first_name": " Anna ", "description": ""})))
            .await
            .unwrap();
        assert_eq!(profile.first_name, "Anna");
        assert_eq!(profile.description, "");
    }

    #[tokio::test]
    async fn test_foreign_profile_and_unknown_keys_rejected() {
        let container = container().await;
        let anna = register(&container, "anna").await;
        let bob = register(&container, "bob").await;
        let use_case = container.profiles_use_case();

        let err = use_case
            .update(&bob, anna.id(), fields(json!({"first_name": "Bob"})))
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());

        let err = use_case
            .update(&anna, anna.id(), fields(json!({"type": "business"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_blank_name_and_taken_email_rejected() {
        let container = container().await;
        let anna = register(&container, "anna").await;
        register(&container, "bob").await;

        let err = container
            .profiles_use_case()
            .update(
                &anna,
                anna.id(),
                fields(json!({"last_name": "  ", "email": "BOB@example.com"})),
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert!(errors.contains("last_name"));
                assert!(errors.contains("email"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
