//! Storage layer
//!
//! [`OrderStore`] is the seam between the order service and persistence.
//! Two implementations:
//!
//! | Store | Backing | Use |
//! |-------|---------|-----|
//! | [`PgOrderStore`] | PostgreSQL (sqlx) | deployments |
//! | [`MemoryOrderStore`] | process memory | development and tests |
//!
//! Both assign order numbers from an atomic counter inside the same unit of
//! work that inserts the order, and both enforce uniqueness of the gateway
//! payment id.

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::order::{Order, OrderLine, OrderStatus, PaymentMethod};
use shared::restaurant::RestaurantInfo;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("An order already exists for gateway payment {0}")]
    DuplicatePayment(String),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order {id} is no longer {expected} (now {actual})")]
    StatusChanged {
        id: i64,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything needed to persist an order except its number
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: i64,
    pub user_id: String,
    pub customer_name: String,
    pub restaurant: RestaurantInfo,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub payment_method: PaymentMethod,
    pub otp: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub note: Option<String>,
    pub created_at: i64,
}

impl NewOrder {
    /// Materialize the persisted order once a number has been assigned
    pub fn into_order(self, order_number: i64) -> Order {
        Order {
            id: self.id,
            order_number,
            user_id: self.user_id,
            customer_name: self.customer_name,
            restaurant_id: self.restaurant.id,
            restaurant_name: self.restaurant.name,
            restaurant_location: self.restaurant.location,
            lines: self.lines,
            subtotal: self.subtotal,
            total_amount: self.total_amount,
            delivery_fee: self.delivery_fee,
            tax: self.tax,
            payment_method: self.payment_method,
            status: OrderStatus::Pending,
            otp: self.otp,
            gateway_order_id: self.gateway_order_id,
            gateway_payment_id: self.gateway_payment_id,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Catalog lookup used to validate and snapshot the restaurant
    async fn find_restaurant(&self, restaurant_id: &str) -> StoreResult<Option<RestaurantInfo>>;

    /// Persist a new order with status `pending`.
    ///
    /// The order number is taken from the atomic counter in the same unit of
    /// work, so a failed insert does not consume a number. Fails with
    /// [`StoreError::DuplicatePayment`] when the gateway payment id is taken.
    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order>;

    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>>;

    /// Newest first
    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>>;

    /// Newest first
    async fn list_all_orders(&self) -> StoreResult<Vec<Order>>;

    /// Compare-and-set the status of an order.
    ///
    /// Writes `next` and `updated_at` only if the stored status is still
    /// `expected`.
    async fn update_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Order>;

    /// Highest order number assigned so far (0 when empty)
    async fn order_count(&self) -> StoreResult<i64>;
}
