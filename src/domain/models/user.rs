use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The marketplace role a profile plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Customer,
    Business,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Customer => "customer",
            ProfileType::Business => "business",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Some(ProfileType::Customer),
            "business" => Some(ProfileType::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated identity. The password hash never leaves the
/// application layer.
#[derive(Debug, Clone)]
pub struct User {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    is_staff: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: i64,
        username: String,
        email: String,
        password_hash: String,
        is_staff: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            is_staff,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Everything needed to persist a fresh account: user row, its profile and
/// its auth token.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub profile_type: ProfileType,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_type: ProfileType,
    pub tel: String,
    pub location: String,
    pub description: String,
    pub working_hours: String,
    pub file: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_business(&self) -> bool {
        self.profile_type == ProfileType::Business
    }

    pub fn is_customer(&self) -> bool {
        self.profile_type == ProfileType::Customer
    }

    /// Applies already validated changes. Replacing the file refreshes
    /// `uploaded_at`.
    pub fn apply(&mut self, changes: ProfileChanges, now: DateTime<Utc>) {
        if let Some(v) = changes.first_name {
            self.first_name = v;
        }
        if let Some(v) = changes.last_name {
            self.last_name = v;
        }
        if let Some(v) = changes.email {
            self.email = v;
        }
        if let Some(v) = changes.location {
            self.location = v;
        }
        if let Some(v) = changes.description {
            self.description = v;
        }
        if let Some(v) = changes.working_hours {
            self.working_hours = v;
        }
        if let Some(v) = changes.tel {
            self.tel = v;
        }
        if let Some(file) = changes.file {
            let file = if file.trim().is_empty() { None } else { Some(file) };
            if file != self.file {
                self.file = file;
                self.uploaded_at = now;
            }
        }
    }
}

/// Partial profile update. Absent fields stay unchanged; an empty `file`
/// clears the picture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
    pub tel: Option<String>,
    pub file: Option<String>,
}
