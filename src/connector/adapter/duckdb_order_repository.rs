use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection, Row, ToSql};
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_support::{decode_features, encode_features, from_micros, parse_text, to_micros};
use crate::application::OrderRepository;
use crate::domain::{DomainError, NewOrder, OfferType, Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_user_id, business_user_id, offer_detail_id, title, revisions, \
     delivery_time_in_days, price, features, offer_type, status, created_at, updated_at";

pub struct DuckdbOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbOrderRepository {
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
            CREATE SEQUENCE IF NOT EXISTS orders_id_seq START 1;

            CREATE TABLE IF NOT EXISTS orders (
                id BIGINT PRIMARY KEY DEFAULT nextval('orders_id_seq'),
                customer_user_id BIGINT NOT NULL,
                business_user_id BIGINT NOT NULL,
                offer_detail_id BIGINT NOT NULL,
                title TEXT NOT NULL,
                revisions INTEGER NOT NULL,
                delivery_time_in_days INTEGER NOT NULL,
                price DOUBLE NOT NULL,
                features TEXT NOT NULL,
                offer_type TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize order schema: {}", e)))?;

        debug!("DuckDB orders table initialized");
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> duckdb::Result<Order> {
        let features: String = row.get(8)?;
        let offer_type: String = row.get(9)?;
        let status: String = row.get(10)?;
        Ok(Order {
            id: row.get(0)?,
            customer_user_id: row.get(1)?,
            business_user_id: row.get(2)?,
            offer_detail_id: row.get(3)?,
            title: row.get(4)?,
            revisions: row.get(5)?,
            delivery_time_in_days: row.get(6)?,
            price: row.get(7)?,
            features: decode_features(8, &features)?,
            offer_type: parse_text(9, &offer_type, OfferType::parse)?,
            status: parse_text(10, &status, OrderStatus::parse)?,
            created_at: from_micros(row.get(11)?),
            updated_at: from_micros(row.get(12)?),
        })
    }
}

#[async_trait]
impl OrderRepository for DuckdbOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let micros = to_micros(now);
        let features = encode_features(&order.features)?;

        let conn = self.conn.lock().await;
        let id: i64 = conn
            .query_row(
                "INSERT INTO orders (customer_user_id, business_user_id, offer_detail_id, title, revisions, \
                 delivery_time_in_days, price, features, offer_type, status, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
                params![
                    order.customer_user_id,
                    order.business_user_id,
                    order.offer_detail_id,
                    order.title,
                    order.revisions,
                    order.delivery_time_in_days,
                    order.price,
                    features,
                    order.offer_type.as_str(),
                    order.status.as_str(),
                    micros,
                    micros,
                ],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to insert order: {}", e)))?;

        debug!("Stored order {}", id);
        Ok(Order {
            id,
            customer_user_id: order.customer_user_id,
            business_user_id: order.business_user_id,
            offer_detail_id: order.offer_detail_id,
            title: order.title,
            revisions: order.revisions,
            delivery_time_in_days: order.delivery_time_in_days,
            price: order.price,
            features: order.features,
            offer_type: order.offer_type,
            status: order.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![id], Self::map_row) {
            Ok(order) => Ok(Some(order)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to load order: {}", e))),
        }
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM orders WHERE customer_user_id = ? OR business_user_id = ? \
                 ORDER BY created_at DESC, id DESC",
                ORDER_COLUMNS
            ))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![user_id, user_id], Self::map_row)
            .map_err(|e| DomainError::storage(format!("Failed to query orders: {}", e)))?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }

        Ok(orders)
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE orders SET status = ?, updated_at = ? WHERE id = ?",
            params![order.status.as_str(), to_micros(order.updated_at), order.id],
        )
        .map_err(|e| DomainError::storage(format!("Failed to update order: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM orders WHERE id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete order: {}", e)))?;

        debug!("Deleted order {}", id);
        Ok(())
    }

    async fn count_for_business(
        &self,
        business_user_id: i64,
        statuses: &[OrderStatus],
    ) -> Result<u64, DomainError> {
        if statuses.is_empty() {
            return Ok(0);
        }

        let conn = self.conn.lock().await;
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) FROM orders WHERE business_user_id = ? AND status IN ({})",
            placeholders
        );

        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
        params_vec.push(Box::new(business_user_id));
        for status in statuses {
            params_vec.push(Box::new(status.as_str()));
        }
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count orders: {}", e)))?;

        Ok(count as u64)
    }
}
