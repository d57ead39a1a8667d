//! PostgreSQL order store

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::order::{Order, OrderLine, OrderStatus, PaymentMethod};
use shared::restaurant::RestaurantInfo;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{NewOrder, OrderStore, StoreError, StoreResult};

/// Name of the partial unique index guarding one order per gateway payment
const PAYMENT_ID_INDEX: &str = "orders_gateway_payment_id_key";

const ORDER_COLUMNS: &str = "id, order_number, user_id, customer_name, restaurant_id, \
     restaurant_name, restaurant_location, lines, subtotal, total_amount, delivery_fee, tax, \
     payment_method, status, otp, gateway_order_id, gateway_payment_id, note, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: i64,
    user_id: String,
    customer_name: String,
    restaurant_id: String,
    restaurant_name: String,
    restaurant_location: String,
    lines: Json<Vec<OrderLine>>,
    subtotal: Decimal,
    total_amount: Decimal,
    delivery_fee: Decimal,
    tax: Decimal,
    payment_method: String,
    status: String,
    otp: String,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    note: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("order {}: {e}", row.id)))?;
        let payment_method = PaymentMethod::parse(&row.payment_method).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "order {}: unknown payment method {}",
                row.id, row.payment_method
            ))
        })?;
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            customer_name: row.customer_name,
            restaurant_id: row.restaurant_id,
            restaurant_name: row.restaurant_name,
            restaurant_location: row.restaurant_location,
            lines: row.lines.0,
            subtotal: row.subtotal,
            total_amount: row.total_amount,
            delivery_fee: row.delivery_fee,
            tax: row.tax,
            payment_method,
            status,
            otp: row.otp,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_orders(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

fn is_duplicate_payment(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(PAYMENT_ID_INDEX)
        }
        _ => false,
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn find_restaurant(&self, restaurant_id: &str) -> StoreResult<Option<RestaurantInfo>> {
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT id, name, location FROM restaurants WHERE id = $1")
                .bind(restaurant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name, location)| RestaurantInfo { id, name, location }))
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the counter serializes concurrent creates; rollback
        // on any later failure releases the number.
        let order_number: i64 = sqlx::query_scalar(
            "INSERT INTO order_counters (name, value) VALUES ('orders', 1)
             ON CONFLICT (name) DO UPDATE SET value = order_counters.value + 1
             RETURNING value",
        )
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "INSERT INTO orders (id, order_number, user_id, customer_name, restaurant_id,
                 restaurant_name, restaurant_location, lines, subtotal, total_amount,
                 delivery_fee, tax, payment_method, status, otp, gateway_order_id,
                 gateway_payment_id, note, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                 $17, $18, $19, $19)",
        )
        .bind(order.id)
        .bind(order_number)
        .bind(&order.user_id)
        .bind(&order.customer_name)
        .bind(&order.restaurant.id)
        .bind(&order.restaurant.name)
        .bind(&order.restaurant.location)
        .bind(Json(&order.lines))
        .bind(order.subtotal)
        .bind(order.total_amount)
        .bind(order.delivery_fee)
        .bind(order.tax)
        .bind(order.payment_method.as_str())
        .bind(OrderStatus::Pending.as_str())
        .bind(&order.otp)
        .bind(&order.gateway_order_id)
        .bind(&order.gateway_payment_id)
        .bind(&order.note)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            if is_duplicate_payment(&e) {
                return Err(StoreError::DuplicatePayment(
                    order.gateway_payment_id.unwrap_or_default(),
                ));
            }
            return Err(e.into());
        }

        tx.commit().await?;
        Ok(order.into_order(order_number))
    }

    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1
             ORDER BY created_at DESC, order_number DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows_to_orders(rows)
    }

    async fn list_all_orders(&self) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, order_number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows_to_orders(rows)
    }

    async fn update_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Order> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $1, updated_at = $2
             WHERE id = $3 AND status = $4
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(next.as_str())
        .bind(updated_at)
        .bind(id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Order::try_from(row);
        }

        // Nothing matched: either the order is gone or someone moved it first
        match self.find_order(id).await? {
            Some(current) => Err(StoreError::StatusChanged {
                id,
                expected,
                actual: current.status,
            }),
            None => Err(StoreError::OrderNotFound(id)),
        }
    }

    async fn order_count(&self) -> StoreResult<i64> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM order_counters WHERE name = 'orders'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.unwrap_or(0))
    }
}
