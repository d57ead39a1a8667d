use std::sync::Arc;

use shared::money::PricingPolicy;
use shared::order::{CreateOrderRequest, Order, OrderStatus, PaymentMethod, validate_create};
use shared::util::{now_millis, snowflake_id};

use super::OrderError;
use super::otp::generate_otp;
use crate::auth::CurrentUser;
use crate::db::{NewOrder, OrderStore, StoreError};
use crate::payment::{self, Verification};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    pricing: PricingPolicy,
    key_secret: Arc<str>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, pricing: PricingPolicy, key_secret: &str) -> Self {
        Self {
            store,
            pricing,
            key_secret: Arc::from(key_secret),
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Validate, verify payment and persist a new `pending` order.
    ///
    /// Every check runs before the store is touched. The order number is
    /// assigned by the store inside the insert.
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        req: CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        let quote = validate_create(&req, &self.pricing)?;

        let restaurant = self
            .store
            .find_restaurant(&req.restaurant_id)
            .await?
            .ok_or_else(|| OrderError::RestaurantNotFound(req.restaurant_id.clone()))?;

        let (gateway_order_id, gateway_payment_id) = match (req.payment_method, &req.payment) {
            (PaymentMethod::Online, None) => return Err(OrderError::PaymentRequired),
            (PaymentMethod::Online, Some(confirmation)) => {
                match payment::verify(confirmation, &self.key_secret)? {
                    Verification::Verified => {}
                    Verification::Rejected => {
                        tracing::warn!(
                            user_id = %user.id,
                            gateway_order_id = %confirmation.gateway_order_id,
                            "Payment signature rejected"
                        );
                        return Err(OrderError::PaymentRejected);
                    }
                }
                (
                    Some(confirmation.gateway_order_id.clone()),
                    Some(confirmation.gateway_payment_id.clone()),
                )
            }
            (PaymentMethod::Cash, Some(_)) => return Err(OrderError::UnexpectedPayment),
            (PaymentMethod::Cash, None) => (None, None),
        };

        let new_order = NewOrder {
            id: snowflake_id(),
            user_id: user.id.clone(),
            customer_name: req.customer_name.trim().to_string(),
            restaurant,
            lines: req.lines,
            subtotal: quote.subtotal,
            total_amount: quote.total,
            delivery_fee: quote.delivery_fee,
            tax: quote.tax,
            payment_method: req.payment_method,
            otp: generate_otp(),
            gateway_order_id,
            gateway_payment_id,
            note: req.note.filter(|n| !n.trim().is_empty()),
            created_at: now_millis(),
        };

        let order = self.store.insert_order(new_order).await.map_err(|e| match e {
            StoreError::DuplicatePayment(_) => OrderError::Store(e),
            other => OrderError::Persistence(other),
        })?;

        tracing::info!(
            order_id = order.id,
            order_number = order.order_number,
            user_id = %order.user_id,
            restaurant_id = %order.restaurant_id,
            total = %order.total_amount,
            payment_method = order.payment_method.as_str(),
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, OrderError> {
        self.store
            .find_order(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    pub async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders_for_user(user_id).await?)
    }

    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_all_orders().await?)
    }

    /// Move an order along the workflow.
    ///
    /// The store write is conditional on the status read here, so two
    /// concurrent transitions cannot both succeed.
    pub async fn update_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let current = self.get_order(order_id).await?;
        let next = current.status.transition_to(new_status)?;
        let order = self
            .store
            .update_status(order_id, current.status, next, now_millis())
            .await?;

        tracing::info!(
            order_id,
            order_number = order.order_number,
            from = %current.status,
            to = %order.status,
            "Order status updated"
        );
        Ok(order)
    }

    /// Highest order number assigned so far
    pub async fn order_count(&self) -> Result<i64, OrderError> {
        Ok(self.store.order_count().await?)
    }
}
