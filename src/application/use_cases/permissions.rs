//! Role and ownership predicates shared by the use cases.

use tracing::warn;

use crate::application::ProfileRepository;
use crate::domain::{DomainError, Profile, ProfileType, User};

pub fn is_owner_or_staff(user: &User, owner_id: i64) -> bool {
    user.id() == owner_id || user.is_staff()
}

pub fn ensure_owner_or_staff(user: &User, owner_id: i64, message: &str) -> Result<(), DomainError> {
    if is_owner_or_staff(user, owner_id) {
        Ok(())
    } else {
        warn!(user_id = user.id(), owner_id, "Rejected: {}", message);
        Err(DomainError::permission_denied(message))
    }
}

pub fn ensure_owner(user: &User, owner_id: i64, message: &str) -> Result<(), DomainError> {
    if user.id() == owner_id {
        Ok(())
    } else {
        warn!(user_id = user.id(), owner_id, "Rejected: {}", message);
        Err(DomainError::permission_denied(message))
    }
}

pub fn ensure_staff(user: &User, message: &str) -> Result<(), DomainError> {
    if user.is_staff() {
        Ok(())
    } else {
        warn!(user_id = user.id(), "Rejected: {}", message);
        Err(DomainError::permission_denied(message))
    }
}

/// Loads the caller's profile and checks it has `role`.
pub async fn require_role(
    profiles: &dyn ProfileRepository,
    user: &User,
    role: ProfileType,
    message: &str,
) -> Result<Profile, DomainError> {
    match profiles.find_by_user(user.id()).await? {
        Some(profile) if profile.profile_type == role => Ok(profile),
        _ => {
            warn!(user_id = user.id(), role = role.as_str(), "Rejected: {}", message);
            Err(DomainError::permission_denied(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, is_staff: bool) -> User {
        User::reconstitute(
            id,
            format!("user{}", id),
            format!("user{}@example.com", id),
            "hash".to_string(),
            is_staff,
            Utc::now(),
        )
    }

    #[test]
    fn test_owner_passes() {
        assert!(is_owner_or_staff(&user(3, false), 3));
        assert!(ensure_owner_or_staff(&user(3, false), 3, "nope").is_ok());
    }

    #[test]
    fn test_staff_passes_for_foreign_objects() {
        assert!(is_owner_or_staff(&user(1, true), 3));
        assert!(ensure_staff(&user(1, true), "nope").is_ok());
    }

    #[test]
    fn test_stranger_is_denied() {
        let err = ensure_owner_or_staff(&user(2, false), 3, "Only the owner may do this.").unwrap_err();
        assert!(err.is_permission_denied());
        assert!(ensure_staff(&user(2, false), "staff only").is_err());
        assert!(ensure_owner(&user(1, true), 3, "owner only").is_err());
    }
}
