//! Cart store
//!
//! In-memory state is authoritative; every mutation is applied synchronously
//! and then handed to the write-behind [`persist::CartPersister`] when one is
//! attached. Totals are always recomputed from the current lines.

pub mod persist;
pub mod session;

pub use persist::CartPersister;
pub use session::{CartLine, CartSession, RestaurantCart};

use rust_decimal::Decimal;
use shared::money::{PricingPolicy, Quote};
use shared::order::{MAX_QUANTITY, OrderLine};
use shared::restaurant::{MenuItem, RestaurantInfo};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CartError, PersistError};

#[derive(Default)]
pub struct CartStore {
    session: CartSession,
    version: u64,
    persister: Option<CartPersister>,
}

impl CartStore {
    /// Memory-only store
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the session persisted at `path` and keep writing changes back.
    /// Must be called inside a tokio runtime.
    pub async fn load(path: impl Into<PathBuf>, debounce: Duration) -> Result<Self, PersistError> {
        let path = path.into();
        let session = persist::load(&path).await?;
        tracing::debug!(
            path = %path.display(),
            carts = session.carts.len(),
            "Cart session loaded"
        );
        let persister = CartPersister::spawn(path, debounce, session.clone());
        Ok(Self {
            session,
            version: 0,
            persister: Some(persister),
        })
    }

    pub fn session(&self) -> &CartSession {
        &self.session
    }

    pub fn active_restaurant_id(&self) -> Option<&str> {
        self.session.active_restaurant_id.as_deref()
    }

    pub fn cart(&self, restaurant_id: &str) -> Option<&RestaurantCart> {
        self.session.cart(restaurant_id)
    }

    fn changed(&mut self) {
        self.version += 1;
        if let Some(persister) = &self.persister {
            persister.publish(self.version, &self.session);
        }
    }

    /// Make `restaurant` the active context, creating an empty cart for it
    /// if needed. Other carts are left untouched.
    pub fn set_active_restaurant(&mut self, restaurant: RestaurantInfo) {
        let id = restaurant.id.clone();
        self.session
            .carts
            .entry(id.clone())
            .and_modify(|cart| cart.restaurant = restaurant.clone())
            .or_insert_with(|| RestaurantCart::new(restaurant));
        self.session.active_restaurant_id = Some(id);
        self.changed();
    }

    fn cart_mut(&mut self, restaurant_id: &str) -> Result<&mut RestaurantCart, CartError> {
        if self.session.active_restaurant_id.is_none() {
            return Err(CartError::NoActiveRestaurant(restaurant_id.to_string()));
        }
        self.session
            .carts
            .get_mut(restaurant_id)
            .ok_or_else(|| CartError::NoActiveRestaurant(restaurant_id.to_string()))
    }

    /// Set the quantity of `item` in a restaurant's cart.
    ///
    /// A quantity of zero or less removes the line (and is a no-op when the
    /// line is absent). Quantities above [`MAX_QUANTITY`] are rejected.
    pub fn add_or_update_line(
        &mut self,
        restaurant_id: &str,
        item: &MenuItem,
        quantity: i64,
    ) -> Result<(), CartError> {
        let cart = self.cart_mut(restaurant_id)?;
        if quantity <= 0 {
            cart.lines.remove(&item.id);
        } else {
            if !item.is_available {
                return Err(CartError::ItemUnavailable(item.id.clone()));
            }
            let quantity = u32::try_from(quantity)
                .ok()
                .filter(|q| *q <= MAX_QUANTITY.unsigned_abs())
                .ok_or_else(|| CartError::QuantityTooLarge {
                    item_id: item.id.clone(),
                    quantity,
                    max: MAX_QUANTITY,
                })?;
            cart.lines.insert(
                item.id.clone(),
                CartLine {
                    item_id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.price,
                    quantity,
                },
            );
        }
        self.changed();
        Ok(())
    }

    /// Same as setting the line's quantity to zero
    pub fn remove_line(&mut self, restaurant_id: &str, item_id: &str) -> Result<(), CartError> {
        let cart = self.cart_mut(restaurant_id)?;
        cart.lines.remove(item_id);
        self.changed();
        Ok(())
    }

    /// Σ unit price × quantity; zero for an unknown or empty cart
    pub fn total(&self, restaurant_id: &str) -> Decimal {
        self.cart(restaurant_id)
            .map(RestaurantCart::total)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn item_count(&self, restaurant_id: &str) -> u32 {
        self.cart(restaurant_id)
            .map(RestaurantCart::item_count)
            .unwrap_or(0)
    }

    pub fn quote(&self, restaurant_id: &str, pricing: &PricingPolicy) -> Quote {
        pricing.quote(self.total(restaurant_id))
    }

    pub fn order_lines(&self, restaurant_id: &str) -> Vec<OrderLine> {
        self.cart(restaurant_id)
            .map(RestaurantCart::order_lines)
            .unwrap_or_default()
    }

    /// Empty one cart, keeping its restaurant info and every other cart
    pub fn clear(&mut self, restaurant_id: &str) {
        if let Some(cart) = self.session.carts.get_mut(restaurant_id) {
            cart.lines.clear();
            self.changed();
        }
    }

    /// Reset the whole session (explicit clear or logout)
    pub fn clear_all(&mut self) {
        self.session = CartSession::default();
        self.changed();
    }

    /// Write pending changes now (app backgrounded or exiting)
    pub async fn flush(&self) -> Result<(), PersistError> {
        match &self.persister {
            Some(persister) => persister.flush().await,
            None => Ok(()),
        }
    }

    /// Flush and stop the background writer
    pub async fn close(self) -> Result<(), PersistError> {
        match self.persister {
            Some(persister) => persister.shutdown().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn restaurant(id: &str) -> RestaurantInfo {
        RestaurantInfo {
            id: id.into(),
            name: format!("Restaurant {id}"),
            location: "Food Court".into(),
        }
    }

    fn item(id: &str, price: Decimal) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: format!("Item {id}"),
            price,
            is_available: true,
        }
    }

    #[test]
    fn test_mutation_without_active_restaurant_fails() {
        let mut cart = CartStore::in_memory();
        let err = cart
            .add_or_update_line("r1", &item("a", dec!(10)), 1)
            .unwrap_err();
        assert_eq!(err, CartError::NoActiveRestaurant("r1".into()));
        assert!(cart.remove_line("r1", "a").is_err());
    }

    #[test]
    fn test_mutation_of_unknown_cart_fails() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        assert!(matches!(
            cart.add_or_update_line("r2", &item("a", dec!(10)), 1),
            Err(CartError::NoActiveRestaurant(_))
        ));
    }

    #[test]
    fn test_total_is_independent_of_upsert_order() {
        let a = item("a", dec!(100));
        let b = item("b", dec!(50));

        let mut first = CartStore::in_memory();
        first.set_active_restaurant(restaurant("r1"));
        first.add_or_update_line("r1", &a, 5).unwrap();
        first.add_or_update_line("r1", &b, 1).unwrap();
        first.add_or_update_line("r1", &a, 2).unwrap();

        let mut second = CartStore::in_memory();
        second.set_active_restaurant(restaurant("r1"));
        second.add_or_update_line("r1", &b, 3).unwrap();
        second.add_or_update_line("r1", &a, 2).unwrap();
        second.add_or_update_line("r1", &b, 1).unwrap();

        assert_eq!(first.total("r1"), dec!(250));
        assert_eq!(second.total("r1"), dec!(250));
        assert_eq!(first.item_count("r1"), 3);
        assert_eq!(first.cart("r1"), second.cart("r1"));
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        cart.add_or_update_line("r1", &item("a", dec!(100)), 2).unwrap();
        cart.add_or_update_line("r1", &item("b", dec!(50)), 1).unwrap();

        cart.add_or_update_line("r1", &item("a", dec!(100)), 0).unwrap();
        assert_eq!(cart.total("r1"), dec!(50));
        assert!(!cart.cart("r1").unwrap().lines.contains_key("a"));

        // Removing an absent line is a no-op
        cart.add_or_update_line("r1", &item("a", dec!(100)), -3).unwrap();
        cart.remove_line("r1", "zzz").unwrap();
        assert_eq!(cart.total("r1"), dec!(50));
    }

    #[test]
    fn test_switching_restaurants_keeps_other_carts() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        cart.add_or_update_line("r1", &item("a", dec!(100)), 2).unwrap();

        cart.set_active_restaurant(restaurant("r2"));
        cart.add_or_update_line("r2", &item("x", dec!(30)), 1).unwrap();
        assert_eq!(cart.active_restaurant_id(), Some("r2"));
        assert_eq!(cart.total("r1"), dec!(200));

        // Back to r1: its lines are still there
        cart.set_active_restaurant(restaurant("r1"));
        assert_eq!(cart.total("r1"), dec!(200));
        assert_eq!(cart.total("r2"), dec!(30));

        // Dormant carts can still be edited while some context is active
        cart.add_or_update_line("r2", &item("x", dec!(30)), 2).unwrap();
        assert_eq!(cart.total("r2"), dec!(60));
        assert_eq!(cart.total("r1"), dec!(200));
    }

    #[test]
    fn test_clear_keeps_info_and_other_carts() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        cart.add_or_update_line("r1", &item("a", dec!(100)), 2).unwrap();
        cart.set_active_restaurant(restaurant("r2"));
        cart.add_or_update_line("r2", &item("x", dec!(30)), 1).unwrap();

        cart.clear("r1");
        assert_eq!(cart.total("r1"), Decimal::ZERO);
        assert_eq!(cart.cart("r1").unwrap().restaurant.name, "Restaurant r1");
        assert_eq!(cart.total("r2"), dec!(30));
        assert_eq!(cart.active_restaurant_id(), Some("r2"));

        cart.clear_all();
        assert!(cart.session().carts.is_empty());
        assert_eq!(cart.active_restaurant_id(), None);
    }

    #[test]
    fn test_unknown_cart_totals_are_zero() {
        let cart = CartStore::in_memory();
        assert_eq!(cart.total("nope"), Decimal::ZERO);
        assert_eq!(cart.item_count("nope"), 0);
        assert!(cart.order_lines("nope").is_empty());
    }

    #[test]
    fn test_unavailable_item_cannot_be_added() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        let mut sold_out = item("a", dec!(10));
        sold_out.is_available = false;
        assert_eq!(
            cart.add_or_update_line("r1", &sold_out, 1),
            Err(CartError::ItemUnavailable("a".into()))
        );
        // Removal still works
        cart.add_or_update_line("r1", &sold_out, 0).unwrap();
    }

    #[test]
    fn test_quantity_above_limit_is_rejected() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        let a = item("a", dec!(10));

        cart.add_or_update_line("r1", &a, 999).unwrap();
        assert_eq!(
            cart.add_or_update_line("r1", &a, 1000),
            Err(CartError::QuantityTooLarge {
                item_id: "a".into(),
                quantity: 1000,
                max: MAX_QUANTITY,
            })
        );
        assert!(matches!(
            cart.add_or_update_line("r1", &item("b", dec!(1)), i64::MAX),
            Err(CartError::QuantityTooLarge { .. })
        ));

        // Rejected updates leave the previous line in place
        assert_eq!(cart.item_count("r1"), 999);
        assert_eq!(cart.total("r1"), dec!(9990));
    }

    #[test]
    fn test_quote_and_order_lines() {
        let mut cart = CartStore::in_memory();
        cart.set_active_restaurant(restaurant("r1"));
        cart.add_or_update_line("r1", &item("A", dec!(100)), 2).unwrap();
        cart.add_or_update_line("r1", &item("B", dec!(50)), 1).unwrap();

        let quote = cart.quote("r1", &PricingPolicy::default());
        assert_eq!(quote.subtotal, dec!(250));
        assert_eq!(quote.delivery_fee, dec!(30));
        assert_eq!(quote.tax, dec!(20));
        assert_eq!(quote.total, dec!(300));

        let lines = cart.order_lines("r1");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].food_id, "A");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(shared::order::lines_subtotal(&lines), dec!(250));
    }
}
