use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection, Row, ToSql};
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_support::{from_micros, to_micros};
use crate::application::ReviewRepository;
use crate::domain::{DomainError, NewReview, Review, ReviewOrdering, ReviewQuery, ReviewStats};

const REVIEW_COLUMNS: &str = "id, business_user_id, reviewer_id, rating, description, created_at, updated_at";

pub struct DuckdbReviewRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbReviewRepository {
    /// Create a new adapter using an existing shared connection.
    pub async fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, DomainError> {
        let conn_guard = conn.lock().await;
        Self::initialize_schema(&conn_guard)?;
        drop(conn_guard);

        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE SEQUENCE IF NOT EXISTS reviews_id_seq START 1;

            CREATE TABLE IF NOT EXISTS reviews (
                id BIGINT PRIMARY KEY DEFAULT nextval('reviews_id_seq'),
                business_user_id BIGINT NOT NULL,
                reviewer_id BIGINT NOT NULL,
                rating INTEGER NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE (reviewer_id, business_user_id)
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize review schema: {}", e)))?;

        debug!("DuckDB reviews table initialized");
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> duckdb::Result<Review> {
        Ok(Review {
            id: row.get(0)?,
            business_user_id: row.get(1)?,
            reviewer_id: row.get(2)?,
            rating: row.get(3)?,
            description: row.get(4)?,
            created_at: from_micros(row.get(5)?),
            updated_at: from_micros(row.get(6)?),
        })
    }

    fn order_clause(ordering: ReviewOrdering) -> &'static str {
        match ordering {
            ReviewOrdering::UpdatedAtAsc => "updated_at ASC, id ASC",
            ReviewOrdering::UpdatedAtDesc => "updated_at DESC, id DESC",
            ReviewOrdering::RatingAsc => "rating ASC, id ASC",
            ReviewOrdering::RatingDesc => "rating DESC, id DESC",
        }
    }
}

#[async_trait]
impl ReviewRepository for DuckdbReviewRepository {
    async fn create(&self, review: NewReview) -> Result<Review, DomainError> {
        let now = Utc::now();
        let micros = to_micros(now);

        let conn = self.conn.lock().await;
        let id: i64 = conn
            .query_row(
                "INSERT INTO reviews (business_user_id, reviewer_id, rating, description, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
                params![
                    review.business_user_id,
                    review.reviewer_id,
                    review.rating,
                    review.description,
                    micros,
                    micros,
                ],
                |row| row.get(0),
            )
            .map_err(|e| {
                if e.to_string().to_lowercase().contains("constraint") {
                    DomainError::already_exists("You have already reviewed this business user.")
                } else {
                    DomainError::storage(format!("Failed to insert review: {}", e))
                }
            })?;

        debug!("Stored review {}", id);
        Ok(Review {
            id,
            business_user_id: review.business_user_id,
            reviewer_id: review.reviewer_id,
            rating: review.rating,
            description: review.description,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM reviews WHERE id = ?", REVIEW_COLUMNS))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![id], Self::map_row) {
            Ok(review) => Ok(Some(review)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load review: {}", e))),
        }
    }

    async fn exists_for_pair(&self, reviewer_id: i64, business_user_id: i64) -> Result<bool, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM reviews WHERE reviewer_id = ? AND business_user_id = ?",
                params![reviewer_id, business_user_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check review: {}", e)))?;

        Ok(count > 0)
    }

    async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, DomainError> {
        let conn = self.conn.lock().await;

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(business_user_id) = query.business_user_id {
            conditions.push("business_user_id = ?");
            params_vec.push(Box::new(business_user_id));
        }
        if let Some(reviewer_id) = query.reviewer_id {
            conditions.push("reviewer_id = ?");
            params_vec.push(Box::new(reviewer_id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM reviews {} ORDER BY {}",
            REVIEW_COLUMNS,
            where_clause,
            Self::order_clause(query.ordering)
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::map_row)
            .map_err(|e| DomainError::storage(format!("Failed to query reviews: {}", e)))?;

        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }

        Ok(reviews)
    }

    async fn update(&self, review: &Review) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE reviews SET rating = ?, description = ?, updated_at = ? WHERE id = ?",
            params![
                review.rating,
                review.description,
                to_micros(review.updated_at),
                review.id
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to update review: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM reviews WHERE id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete review: {}", e)))?;

        debug!("Deleted review {}", id);
        Ok(())
    }

    async fn stats(&self) -> Result<ReviewStats, DomainError> {
        let conn = self.conn.lock().await;
        let (count, average): (i64, Option<f64>) = conn
            .query_row("SELECT COUNT(*), AVG(rating) FROM reviews", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(|e| DomainError::storage(format!("Failed to aggregate reviews: {}", e)))?;

        Ok(ReviewStats {
            count: count as u64,
            average_rating: average,
        })
    }
}
