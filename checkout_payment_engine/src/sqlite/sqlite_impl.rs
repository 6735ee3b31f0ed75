use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db_types::{NewOrder, Order, PaymentStatus};
use crate::sqlite::db;
use crate::traits::{OrderFlowError, OrderStore, StatusOverrideResult};

/// The SQLite-backed [`OrderStore`]. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({} connections)", self.pool.size())
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url`, creating the file and schema as needed.
    pub async fn new(url: &str) -> Result<Self, OrderFlowError> {
        let pool = crate::sqlite::new_pool(url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderStore for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let inserted = db::orders::insert_order(order, &mut *tx).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_order_by_id(id, &mut conn).await?)
    }

    async fn fetch_order_for_user(&self, owner_id: &str, id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_order_for_user(owner_id, id, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, owner_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_orders_for_user(owner_id, &mut conn).await?)
    }

    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_order_by_gateway_order_id(gateway_order_id, &mut conn).await?)
    }

    async fn settle_payment(
        &self,
        order_id: i64,
        new_status: PaymentStatus,
        payment_id: Option<String>,
        reconciled_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::settle_payment(order_id, new_status, payment_id.as_deref(), reconciled_at, &mut conn).await?)
    }

    async fn override_status(
        &self,
        order_id: i64,
        new_status: PaymentStatus,
    ) -> Result<StatusOverrideResult, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::override_status(order_id, new_status, &mut conn).await?)
    }
}
