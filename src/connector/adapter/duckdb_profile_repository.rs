use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_support::{from_micros, parse_text, to_micros};
use crate::application::ProfileRepository;
use crate::domain::{DomainError, Profile, ProfileType};

const PROFILE_COLUMNS: &str = "user_id, username, email, first_name, last_name, type, tel, location, \
     description, working_hours, file, uploaded_at, created_at";

/// Reads and writes the `profiles` table created by the user adapter.
pub struct DuckdbProfileRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbProfileRepository {
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> duckdb::Result<Profile> {
        let profile_type: String = row.get(5)?;
        Ok(Profile {
            user_id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            profile_type: parse_text(5, &profile_type, ProfileType::parse)?,
            tel: row.get(6)?,
            location: row.get(7)?,
            description: row.get(8)?,
            working_hours: row.get(9)?,
            file: row.get(10)?,
            uploaded_at: from_micros(row.get(11)?),
            created_at: from_micros(row.get(12)?),
        })
    }
}

#[async_trait]
impl ProfileRepository for DuckdbProfileRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM profiles WHERE user_id = ?", PROFILE_COLUMNS))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![user_id], Self::map_row) {
            Ok(profile) => Ok(Some(profile)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load profile: {}", e))),
        }
    }

    async fn list_by_type(&self, profile_type: ProfileType) -> Result<Vec<Profile>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM profiles WHERE type = ? ORDER BY user_id",
                PROFILE_COLUMNS
            ))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![profile_type.as_str()], Self::map_row)
            .map_err(|e| DomainError::storage(format!("Failed to query profiles: {}", e)))?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }

        Ok(profiles)
    }

    async fn count_by_type(&self, profile_type: ProfileType) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM profiles WHERE type = ?",
                params![profile_type.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to count profiles: {}", e)))?;

        Ok(count as u64)
    }

    async fn email_taken(&self, email: &str, except_user: Option<i64>) -> Result<bool, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM profiles WHERE lower(email) = lower(?) AND user_id <> ?",
                params![email, except_user.unwrap_or(-1)],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check email: {}", e)))?;

        Ok(count > 0)
    }

    /// The account e-mail mirrors the profile e-mail.
    async fn update(&self, profile: &Profile) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            r#"
            UPDATE profiles SET
                email = ?, first_name = ?, last_name = ?, tel = ?, location = ?,
                description = ?, working_hours = ?, file = ?, uploaded_at = ?
            WHERE user_id = ?
            "#,
            params![
                profile.email,
                profile.first_name,
                profile.last_name,
                profile.tel,
                profile.location,
                profile.description,
                profile.working_hours,
                profile.file,
                to_micros(profile.uploaded_at),
                profile.user_id,
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to update profile: {}", e)))?;

        tx.execute(
            "UPDATE users SET email = ? WHERE id = ?",
            params![profile.email, profile.user_id],
        )
        .map_err(|e| DomainError::storage(format!("Failed to update user email: {}", e)))?;

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Saved profile of user {}", profile.user_id);
        Ok(())
    }
}
