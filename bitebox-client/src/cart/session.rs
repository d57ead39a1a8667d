//! Cart data model
//!
//! A session holds one cart per restaurant and a pointer to the active one.
//! Switching restaurants never merges or drops the other carts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::money::line_total;
use shared::order::{MAX_QUANTITY, OrderLine};
use shared::restaurant::RestaurantInfo;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    /// 1..=MAX_QUANTITY; a zero quantity removes the line
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantCart {
    pub restaurant: RestaurantInfo,
    #[serde(default)]
    pub lines: BTreeMap<String, CartLine>,
}

impl RestaurantCart {
    pub fn new(restaurant: RestaurantInfo) -> Self {
        Self {
            restaurant,
            lines: BTreeMap::new(),
        }
    }

    pub fn total(&self) -> Decimal {
        self.lines.values().map(CartLine::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .values()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in the shape the order API expects
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .values()
            .map(|l| OrderLine {
                food_id: l.item_id.clone(),
                name: l.name.clone(),
                // Out-of-range quantities stay out of range so validation
                // rejects them instead of ordering a different amount
                quantity: i32::try_from(l.quantity).unwrap_or(MAX_QUANTITY + 1),
                unit_price: l.unit_price,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSession {
    #[serde(default)]
    pub active_restaurant_id: Option<String>,
    #[serde(default)]
    pub carts: BTreeMap<String, RestaurantCart>,
}

impl CartSession {
    pub fn cart(&self, restaurant_id: &str) -> Option<&RestaurantCart> {
        self.carts.get(restaurant_id)
    }

    /// Drop lines with a quantity outside 1..=MAX_QUANTITY and an active
    /// pointer to a missing cart. Applied to anything loaded from disk.
    pub fn normalized(mut self) -> Self {
        let max = MAX_QUANTITY.unsigned_abs();
        for cart in self.carts.values_mut() {
            cart.lines.retain(|_, l| (1..=max).contains(&l.quantity));
        }
        if let Some(id) = &self.active_restaurant_id
            && !self.carts.contains_key(id)
        {
            self.active_restaurant_id = None;
        }
        self
    }
}
