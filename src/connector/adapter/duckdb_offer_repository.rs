use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection, Row, ToSql};
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_support::{decode_features, encode_features, from_micros, parse_text, to_micros};
use crate::application::OfferRepository;
use crate::domain::{
    DomainError, NewOffer, Offer, OfferDetail, OfferOrdering, OfferPage, OfferQuery, OfferType,
};

const DETAIL_COLUMNS: &str =
    "id, offer_id, title, revisions, delivery_time_in_days, price, features, offer_type";

pub struct DuckdbOfferRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbOfferRepository {
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
            CREATE SEQUENCE IF NOT EXISTS offers_id_seq START 1;
            CREATE SEQUENCE IF NOT EXISTS offer_details_id_seq START 1;

            CREATE TABLE IF NOT EXISTS offers (
                id BIGINT PRIMARY KEY DEFAULT nextval('offers_id_seq'),
                user_id BIGINT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image TEXT,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS offer_details (
                id BIGINT PRIMARY KEY DEFAULT nextval('offer_details_id_seq'),
                offer_id BIGINT NOT NULL,
                title TEXT NOT NULL,
                revisions INTEGER NOT NULL,
                delivery_time_in_days INTEGER NOT NULL,
                price DOUBLE NOT NULL,
                features TEXT NOT NULL,
                offer_type TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_offers_user ON offers(user_id);
            CREATE INDEX IF NOT EXISTS idx_offer_details_offer ON offer_details(offer_id);
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize offer schema: {}", e)))?;

        debug!("DuckDB offer schema initialized");
        Ok(())
    }

    fn map_detail(row: &Row<'_>) -> duckdb::Result<OfferDetail> {
        let features: String = row.get(6)?;
        let offer_type: String = row.get(7)?;
        Ok(OfferDetail {
            id: row.get(0)?,
            offer_id: row.get(1)?,
            title: row.get(2)?,
            revisions: row.get(3)?,
            delivery_time_in_days: row.get(4)?,
            price: row.get(5)?,
            features: decode_features(6, &features)?,
            offer_type: parse_text(7, &offer_type, OfferType::parse)?,
        })
    }

    fn load_details(conn: &Connection, offer_id: i64) -> Result<Vec<OfferDetail>, DomainError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM offer_details WHERE offer_id = ? ORDER BY id",
                DETAIL_COLUMNS
            ))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![offer_id], Self::map_detail)
            .map_err(|e| DomainError::storage(format!("Failed to query offer details: {}", e)))?;

        let mut details = Vec::new();
        for row in rows {
            details.push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }
        Ok(details)
    }

    fn load_offer(conn: &Connection, id: i64) -> Result<Option<Offer>, DomainError> {
        let row = conn.query_row(
            "SELECT id, user_id, title, description, image, created_at, updated_at FROM offers WHERE id = ?",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            },
        );

        let (id, user_id, title, description, image, created_at, updated_at) = match row {
            Ok(values) => values,
            Err(duckdb::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(DomainError::storage(format!("Failed to load offer: {}", e))),
        };

        let details = Self::load_details(conn, id)?;
        Ok(Some(Offer::reconstitute(
            id,
            user_id,
            title,
            description,
            image,
            from_micros(created_at),
            from_micros(updated_at),
            details,
        )))
    }

    /// WHERE clause and parameters shared by the page and count queries.
    fn filter_clause(query: &OfferQuery) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(creator) = query.creator_id() {
            conditions.push("o.user_id = ?");
            values.push(Box::new(creator));
        }
        if let Some(min_price) = query.min_price() {
            conditions.push("a.min_price >= ?");
            values.push(Box::new(min_price));
        }
        if let Some(days) = query.max_delivery_time() {
            conditions.push("a.min_delivery_time <= ?");
            values.push(Box::new(days));
        }
        if let Some(term) = query.search() {
            conditions.push("(contains(lower(o.title), ?) OR contains(lower(o.description), ?))");
            values.push(Box::new(term.to_string()));
            values.push(Box::new(term.to_string()));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (clause, values)
    }

    fn order_clause(ordering: OfferOrdering) -> &'static str {
        match ordering {
            OfferOrdering::CreatedAtAsc => "o.created_at ASC, o.id ASC",
            OfferOrdering::CreatedAtDesc => "o.created_at DESC, o.id DESC",
            OfferOrdering::MinPriceAsc => "a.min_price ASC NULLS LAST, o.id ASC",
            OfferOrdering::MinPriceDesc => "a.min_price DESC NULLS LAST, o.id DESC",
            OfferOrdering::UpdatedAtAsc => "o.updated_at ASC, o.id ASC",
            OfferOrdering::UpdatedAtDesc => "o.updated_at DESC, o.id DESC",
        }
    }

    fn insert_detail(conn: &Connection, offer_id: i64, detail: &OfferDetail) -> Result<i64, DomainError> {
        conn.query_row(
            "INSERT INTO offer_details (offer_id, title, revisions, delivery_time_in_days, price, features, offer_type) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
            params![
                offer_id,
                detail.title,
                detail.revisions,
                detail.delivery_time_in_days,
                detail.price,
                encode_features(&detail.features)?,
                detail.offer_type.as_str(),
            ],
            |row| row.get(0),
        )
        .map_err(|e| DomainError::storage(format!("Failed to insert offer detail: {}", e)))
    }
}

const AGGREGATE_CTE: &str = r#"
    WITH a AS (
        SELECT offer_id, MIN(price) AS min_price, MIN(delivery_time_in_days) AS min_delivery_time
        FROM offer_details
        GROUP BY offer_id
    )
"#;

#[async_trait]
impl OfferRepository for DuckdbOfferRepository {
    async fn create(&self, offer: NewOffer) -> Result<Offer, DomainError> {
        let now = Utc::now();
        let micros = to_micros(now);

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let offer_id: i64 = tx
            .query_row(
                "INSERT INTO offers (user_id, title, description, image, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
                params![offer.user_id, offer.title, offer.description, offer.image, micros, micros],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to insert offer: {}", e)))?;

        let mut details = Vec::with_capacity(offer.details.len());
        for new_detail in offer.details {
            let mut detail = OfferDetail {
                id: 0,
                offer_id,
                title: new_detail.title,
                revisions: new_detail.revisions,
                delivery_time_in_days: new_detail.delivery_time_in_days,
                price: new_detail.price,
                features: new_detail.features,
                offer_type: new_detail.offer_type,
            };
            detail.id = Self::insert_detail(&tx, offer_id, &detail)?;
            details.push(detail);
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Stored offer {} with {} details", offer_id, details.len());
        Ok(Offer::reconstitute(
            offer_id,
            offer.user_id,
            offer.title,
            offer.description,
            offer.image,
            now,
            now,
            details,
        ))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError> {
        let conn = self.conn.lock().await;
        Self::load_offer(&conn, id)
    }

    async fn find_detail(&self, detail_id: i64) -> Result<Option<OfferDetail>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM offer_details WHERE id = ?", DETAIL_COLUMNS))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![detail_id], Self::map_detail) {
            Ok(detail) => Ok(Some(detail)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load offer detail: {}", e))),
        }
    }

    async fn search(&self, query: &OfferQuery) -> Result<OfferPage, DomainError> {
        let conn = self.conn.lock().await;
        let (where_clause, mut values) = Self::filter_clause(query);

        let count_sql = format!(
            "{} SELECT COUNT(*) FROM offers o LEFT JOIN a ON a.offer_id = o.id {}",
            AGGREGATE_CTE, where_clause
        );
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let count: i64 = conn
            .query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count offers: {}", e)))?;

        let page_sql = format!(
            "{} SELECT o.id FROM offers o LEFT JOIN a ON a.offer_id = o.id {} ORDER BY {} LIMIT ? OFFSET ?",
            AGGREGATE_CTE,
            where_clause,
            Self::order_clause(query.ordering())
        );
        values.push(Box::new(i64::from(query.page_size())));
        values.push(Box::new(query.offset() as i64));
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|b| b.as_ref()).collect();

        let ids: Vec<i64> = {
            let mut stmt = conn
                .prepare(&page_sql)
                .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;
            let rows = stmt
                .query_map(params_refs.as_slice(), |row| row.get(0))
                .map_err(|e| DomainError::storage(format!("Failed to query offers: {}", e)))?;

            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
            }
            ids
        };

        let mut offers = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(offer) = Self::load_offer(&conn, id)? {
                offers.push(offer);
            }
        }

        Ok(OfferPage {
            count: count as u64,
            offers,
        })
    }

    async fn update(&self, offer: &Offer) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "UPDATE offers SET title = ?, description = ?, image = ?, updated_at = ? WHERE id = ?",
            params![
                offer.title(),
                offer.description(),
                offer.image(),
                to_micros(offer.updated_at()),
                offer.id(),
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to update offer: {}", e)))?;

        for detail in offer.details() {
            tx.execute(
                "UPDATE offer_details SET title = ?, revisions = ?, delivery_time_in_days = ?, \
                 price = ?, features = ?, offer_type = ? WHERE id = ?",
                params![
                    detail.title,
                    detail.revisions,
                    detail.delivery_time_in_days,
                    detail.price,
                    encode_features(&detail.features)?,
                    detail.offer_type.as_str(),
                    detail.id,
                ],
            )
            .map_err(|e| DomainError::storage(format!("Failed to update offer detail: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Saved offer {}", offer.id());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        tx.execute("DELETE FROM offer_details WHERE offer_id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete offer details: {}", e)))?;
        tx.execute("DELETE FROM offers WHERE id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete offer: {}", e)))?;

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Deleted offer {} and its details", id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM offers", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count offers: {}", e)))?;

        Ok(count as u64)
    }
}
