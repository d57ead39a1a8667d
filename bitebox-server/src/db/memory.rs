//! In-memory order store
//!
//! A single `tokio::sync::Mutex` guards the whole state, which makes every
//! operation atomic with respect to concurrent handlers: counter increment,
//! payment-id check and insert happen under one lock acquisition.

use async_trait::async_trait;
use shared::order::{Order, OrderStatus};
use shared::restaurant::RestaurantInfo;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{NewOrder, OrderStore, StoreError, StoreResult};

#[derive(Default)]
struct MemoryState {
    restaurants: HashMap<String, RestaurantInfo>,
    orders: BTreeMap<i64, Order>,
    payment_ids: HashSet<String>,
    order_counter: i64,
}

impl MemoryState {
    fn next_order_number(&mut self) -> i64 {
        self.order_counter += 1;
        self.order_counter
    }
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with catalog entries
    pub fn with_restaurants(restaurants: impl IntoIterator<Item = RestaurantInfo>) -> Self {
        let state = MemoryState {
            restaurants: restaurants
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn add_restaurant(&self, restaurant: RestaurantInfo) {
        let mut state = self.state.lock().await;
        state.restaurants.insert(restaurant.id.clone(), restaurant);
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.order_number.cmp(&a.order_number))
    });
    orders
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_restaurant(&self, restaurant_id: &str) -> StoreResult<Option<RestaurantInfo>> {
        let state = self.state.lock().await;
        Ok(state.restaurants.get(restaurant_id).cloned())
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut state = self.state.lock().await;

        if let Some(payment_id) = &order.gateway_payment_id
            && state.payment_ids.contains(payment_id)
        {
            return Err(StoreError::DuplicatePayment(payment_id.clone()));
        }

        let order_number = state.next_order_number();
        let order = order.into_order(order_number);
        if let Some(payment_id) = &order.gateway_payment_id {
            state.payment_ids.insert(payment_id.clone());
        }
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        let orders = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list_all_orders(&self) -> StoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(newest_first(state.orders.values().cloned().collect()))
    }

    async fn update_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: i64,
    ) -> StoreResult<Order> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        if order.status != expected {
            return Err(StoreError::StatusChanged {
                id,
                expected,
                actual: order.status,
            });
        }
        order.status = next;
        order.updated_at = updated_at;
        Ok(order.clone())
    }

    async fn order_count(&self) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state.order_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shared::order::{OrderLine, PaymentMethod};

    fn restaurant() -> RestaurantInfo {
        RestaurantInfo {
            id: "r1".into(),
            name: "Dosa Corner".into(),
            location: "Block A".into(),
        }
    }

    fn new_order(id: i64, payment_id: Option<&str>, created_at: i64) -> NewOrder {
        NewOrder {
            id,
            user_id: "u1".into(),
            customer_name: "Asha".into(),
            restaurant: restaurant(),
            lines: vec![OrderLine {
                food_id: "f1".into(),
                name: "Masala Dosa".into(),
                quantity: 1,
                unit_price: dec!(80),
            }],
            subtotal: dec!(80),
            total_amount: dec!(116),
            delivery_fee: dec!(30),
            tax: dec!(6),
            payment_method: PaymentMethod::Online,
            otp: "123456".into(),
            gateway_order_id: payment_id.map(|_| "order_1".to_string()),
            gateway_payment_id: payment_id.map(String::from),
            note: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_numbers_start_at_one_and_increase() {
        let store = MemoryOrderStore::with_restaurants([restaurant()]);
        assert_eq!(store.order_count().await.unwrap(), 0);

        let a = store.insert_order(new_order(1, None, 10)).await.unwrap();
        let b = store.insert_order(new_order(2, None, 20)).await.unwrap();
        assert_eq!(a.order_number, 1);
        assert_eq!(b.order_number, 2);
        assert_eq!(a.status, OrderStatus::Pending);
        assert_eq!(store.order_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_payment_does_not_consume_a_number() {
        let store = MemoryOrderStore::new();
        store.insert_order(new_order(1, Some("pay_1"), 10)).await.unwrap();

        let err = store
            .insert_order(new_order(2, Some("pay_1"), 20))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePayment(ref p) if p == "pay_1"));

        let next = store.insert_order(new_order(3, Some("pay_2"), 30)).await.unwrap();
        assert_eq!(next.order_number, 2);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = MemoryOrderStore::new();
        store.insert_order(new_order(1, None, 10)).await.unwrap();
        store.insert_order(new_order(2, None, 30)).await.unwrap();
        store.insert_order(new_order(3, None, 20)).await.unwrap();

        let ids: Vec<i64> = store
            .list_all_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(store.list_orders_for_user("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let store = MemoryOrderStore::new();
        store.insert_order(new_order(7, None, 10)).await.unwrap();

        let updated = store
            .update_status(7, OrderStatus::Pending, OrderStatus::Cancelled, 99)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(updated.updated_at, 99);

        let err = store
            .update_status(7, OrderStatus::Pending, OrderStatus::ReadyToPick, 100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusChanged {
                actual: OrderStatus::Cancelled,
                ..
            }
        ));

        let err = store
            .update_status(8, OrderStatus::Pending, OrderStatus::Cancelled, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OrderNotFound(8)));
    }
}
