//! Catalog read types (restaurants and menu items)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant snapshot carried by carts and orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Menu item as served by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Price in major currency units
    pub price: Decimal,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}
