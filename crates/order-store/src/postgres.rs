use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, OrderNumber};
use domain::{Money, Order, OrderLineItem};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::store::OrderStore;
use crate::{Result, StoreError};

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_line_item(row: &PgRow) -> Result<OrderLineItem> {
        Ok(OrderLineItem {
            sku_code: row.try_get::<String, _>("sku_code")?.into(),
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number()))]
    async fn save(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.order_number().as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_order_number")
            {
                return StoreError::DuplicateOrderNumber(order.order_number().clone());
            }
            StoreError::Database(e)
        })?;

        for (line_no, item) in order.line_items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, line_no, sku_code, unit_price_cents, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id().as_uuid())
            .bind(line_no as i32)
            .bind(item.sku_code.as_str())
            .bind(item.unit_price.cents())
            .bind(item.quantity as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        metrics::counter!("orders_persisted_total").increment(1);
        Ok(())
    }

    async fn find_by_order_number(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        let order_row = sqlx::query(
            r#"
            SELECT id, order_number
            FROM orders
            WHERE order_number = $1
            "#,
        )
        .bind(order_number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(order_row) = order_row else {
            return Ok(None);
        };

        let id = OrderId::from_uuid(order_row.try_get::<Uuid, _>("id")?);
        let number = OrderNumber::from_string(order_row.try_get::<String, _>("order_number")?);

        let item_rows = sqlx::query(
            r#"
            SELECT sku_code, unit_price_cents, quantity
            FROM order_line_items
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let line_items = item_rows
            .iter()
            .map(Self::row_to_line_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Order::from_parts(id, number, line_items)))
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
