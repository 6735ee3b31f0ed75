//! SQLite backend for the order store.
//!
//! The raw queries live in [`db`] as plain functions over a connection; [`SqliteDatabase`]
//! wraps a pool and implements the [`OrderStore`](crate::traits::OrderStore) trait on top of
//! them.

pub mod db;
mod sqlite_impl;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
pub use sqlite_impl::SqliteDatabase;

/// The database URL, taken from `CPG_DATABASE_URL` with a local-file fallback.
pub fn db_url() -> String {
    let result = std::env::var("CPG_DATABASE_URL").unwrap_or_else(|_| "sqlite://data/cpg.db".to_string());
    info!("🗃️ Using database URL: {result}");
    result
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        total_amount INTEGER NOT NULL CHECK (total_amount > 0),
        payment_method TEXT NOT NULL,
        payment_status TEXT NOT NULL,
        line1 TEXT NOT NULL,
        line2 TEXT,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        country TEXT NOT NULL,
        phone TEXT,
        gateway_order_id TEXT UNIQUE,
        gateway_payment_id TEXT,
        gateway_signature TEXT,
        estimated_delivery_date TIMESTAMP,
        reconciled_at TIMESTAMP,
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_orders_owner_id ON orders (owner_id)",
    "CREATE TABLE IF NOT EXISTS order_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id INTEGER NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        product_id TEXT NOT NULL,
        product_name TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        unit_price INTEGER NOT NULL CHECK (unit_price > 0)
    )",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items (order_id)",
];

/// Creates a connection pool against `url`, creating the database file and schema if they do
/// not exist yet.
pub async fn new_pool(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = url.parse::<SqliteConnectOptions>()?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok(pool)
}
