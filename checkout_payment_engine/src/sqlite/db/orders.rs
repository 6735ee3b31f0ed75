//! Order queries. These are plain functions over a connection so that callers decide the
//! transaction boundaries; [`SqliteDatabase`](crate::SqliteDatabase) is the only caller.

use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderItem, PaymentStatus};
use crate::traits::{OrderFlowError, StatusOverrideResult};

/// Inserts the order row and its line items. Run this inside a transaction so a failed item
/// insert does not leave a dangling order behind.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let gateway_order_id = order.gateway_order_id.clone();
    let result = sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders (
            owner_id, total_amount, payment_method, payment_status,
            line1, line2, city, state, postal_code, country, phone,
            gateway_order_id, gateway_payment_id, gateway_signature,
            estimated_delivery_date, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *"#,
    )
    .bind(&order.owner_id)
    .bind(order.total_amount)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(&order.shipping_address.line1)
    .bind(&order.shipping_address.line2)
    .bind(&order.shipping_address.city)
    .bind(&order.shipping_address.state)
    .bind(&order.shipping_address.postal_code)
    .bind(&order.shipping_address.country)
    .bind(&order.shipping_address.phone)
    .bind(&order.gateway_order_id)
    .bind(&order.gateway_payment_id)
    .bind(&order.gateway_signature)
    .bind(order.estimated_delivery_date)
    .bind(order.created_at)
    .bind(order.created_at)
    .fetch_one(&mut *conn)
    .await;
    let mut inserted = match result {
        Ok(o) => o,
        Err(e) if is_unique_violation(&e) => {
            let id = gateway_order_id.unwrap_or_default();
            return Err(OrderFlowError::DuplicateGatewayOrder(id));
        },
        Err(e) => return Err(e.into()),
    };
    for item in &order.items {
        sqlx::query(
            r#"INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
            VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(inserted.id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }
    inserted.items = order.items;
    debug!("🗃️ Inserted order {} for {}", inserted.id, inserted.owner_id);
    Ok(inserted)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false)
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(
        "SELECT product_id, product_name, quantity, unit_price FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await
}

async fn attach_items(mut order: Order, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    order.items = fetch_items_for_order(order.id, conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(o) => Ok(Some(attach_items(o, conn).await?)),
        None => Ok(None),
    }
}

pub async fn fetch_order_for_user(
    owner_id: &str,
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(o) => Ok(Some(attach_items(o, conn).await?)),
        None => Ok(None),
    }
}

pub async fn fetch_orders_for_user(owner_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        result.push(attach_items(order, conn).await?);
    }
    Ok(result)
}

pub async fn fetch_order_by_gateway_order_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE gateway_order_id = ?")
        .bind(gateway_order_id)
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(o) => Ok(Some(attach_items(o, conn).await?)),
        None => Ok(None),
    }
}

/// The conditional settlement write. The `payment_status NOT IN (...)` guard and the update
/// execute as one statement, so of any number of concurrent attempts against the same order,
/// exactly one sees a row come back.
pub async fn settle_payment(
    order_id: i64,
    new_status: PaymentStatus,
    payment_id: Option<&str>,
    reconciled_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let updated = sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET
            payment_status = ?,
            gateway_payment_id = COALESCE(gateway_payment_id, ?),
            reconciled_at = ?,
            updated_at = ?
        WHERE id = ? AND payment_status NOT IN ('completed', 'failed', 'cancelled')
        RETURNING *"#,
    )
    .bind(new_status)
    .bind(payment_id)
    .bind(reconciled_at)
    .bind(reconciled_at)
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(o) => {
            debug!("🗃️ Order {order_id} settled as {new_status}");
            Ok(Some(attach_items(o, conn).await?))
        },
        None => Ok(None),
    }
}

/// Operator override. Same guard as [`settle_payment`], but a rejected write is resolved into
/// "order is terminal" vs "order does not exist" for the caller.
pub async fn override_status(
    order_id: i64,
    new_status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<StatusOverrideResult, sqlx::Error> {
    let updated = sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET payment_status = ?, updated_at = ?
        WHERE id = ? AND payment_status NOT IN ('completed', 'failed', 'cancelled')
        RETURNING *"#,
    )
    .bind(new_status)
    .bind(Utc::now())
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(order) = updated {
        let order = attach_items(order, conn).await?;
        return Ok(StatusOverrideResult::Applied(order));
    }
    let current = sqlx::query_scalar::<_, PaymentStatus>("SELECT payment_status FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
    match current {
        Some(status) => Ok(StatusOverrideResult::AlreadyTerminal(status)),
        None => Ok(StatusOverrideResult::NotFound),
    }
}
