use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_support::{from_micros, to_micros};
use crate::application::UserRepository;
use crate::domain::{DomainError, NewUser, User};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.is_staff, u.created_at";

/// Owns the DuckDB connection; the other adapters share it through
/// [`DuckdbUserRepository::shared_connection`].
pub struct DuckdbUserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbUserRepository {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns a clone of the shared connection Arc.
    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;

            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY DEFAULT nextval('users_id_seq'),
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                is_staff BOOLEAN NOT NULL DEFAULT false,
                created_at BIGINT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                user_id BIGINT PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                type TEXT NOT NULL,
                tel TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                working_hours TEXT NOT NULL DEFAULT '',
                file TEXT,
                uploaded_at BIGINT NOT NULL,
                created_at BIGINT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS auth_tokens (
                user_id BIGINT PRIMARY KEY,
                token TEXT NOT NULL,
                created_at BIGINT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_profiles_type ON profiles(type);
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize user schema: {}", e)))?;

        debug!("DuckDB user schema initialized");
        Ok(())
    }

    fn find_one<P: duckdb::Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<User>, DomainError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params, |row| {
            Ok(User::reconstitute(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                from_micros(row.get(5)?),
            ))
        }) {
            Ok(user) => Ok(Some(user)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load user: {}", e))),
        }
    }
}

#[async_trait]
impl UserRepository for DuckdbUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let now = Utc::now();
        let micros = to_micros(now);

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let id: i64 = tx
            .query_row(
                "INSERT INTO users (username, email, password_hash, is_staff, created_at) \
                 VALUES (?, ?, ?, ?, ?) RETURNING id",
                params![user.username, user.email, user.password_hash, user.is_staff, micros],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to insert user: {}", e)))?;

        tx.execute(
            "INSERT INTO profiles (user_id, username, email, type, uploaded_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![id, user.username, user.email, user.profile_type.as_str(), micros, micros],
        )
        .map_err(|e| DomainError::storage(format!("Failed to insert profile: {}", e)))?;

        tx.execute(
            "INSERT INTO auth_tokens (user_id, token, created_at) VALUES (?, ?, ?)",
            params![id, user.token, micros],
        )
        .map_err(|e| DomainError::storage(format!("Failed to insert token: {}", e)))?;

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Stored user {} with {} profile", id, user.profile_type);
        Ok(User::reconstitute(
            id,
            user.username,
            user.email,
            user.password_hash,
            user.is_staff,
            now,
        ))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let conn = self.conn.lock().await;
        Self::find_one(
            &conn,
            &format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS),
            params![id],
        )
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let conn = self.conn.lock().await;
        Self::find_one(
            &conn,
            &format!("SELECT {} FROM users u WHERE u.username = ?", USER_COLUMNS),
            params![username],
        )
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, DomainError> {
        let conn = self.conn.lock().await;
        Self::find_one(
            &conn,
            &format!(
                "SELECT {} FROM users u JOIN auth_tokens t ON t.user_id = u.id WHERE t.token = ?",
                USER_COLUMNS
            ),
            params![token],
        )
    }

    async fn token_for(&self, user_id: i64) -> Result<Option<String>, DomainError> {
        let conn = self.conn.lock().await;
        match conn.query_row(
            "SELECT token FROM auth_tokens WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        ) {
            Ok(token) => Ok(Some(token)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load token: {}", e))),
        }
    }

    async fn save_token(&self, user_id: i64, token: &str) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO auth_tokens (user_id, token, created_at) VALUES (?, ?, ?)",
            params![user_id, token, to_micros(Utc::now())],
        )
        .map_err(|e| DomainError::storage(format!("Failed to save token: {}", e)))?;

        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?",
                params![username],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check username: {}", e)))?;

        Ok(count > 0)
    }
}
