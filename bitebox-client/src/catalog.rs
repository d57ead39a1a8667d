//! Restaurant and menu lookups
//!
//! The catalog service is external; the client only needs reads.

use async_trait::async_trait;
use shared::restaurant::{MenuItem, RestaurantInfo};
use std::collections::HashMap;

use crate::ClientResult;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn restaurant(&self, id: &str) -> ClientResult<Option<RestaurantInfo>>;

    /// Menu of one restaurant; empty for an unknown restaurant
    async fn menu(&self, restaurant_id: &str) -> ClientResult<Vec<MenuItem>>;

    /// Single menu item, looked up through [`Catalog::menu`]
    async fn menu_item(&self, restaurant_id: &str, item_id: &str) -> ClientResult<Option<MenuItem>> {
        Ok(self
            .menu(restaurant_id)
            .await?
            .into_iter()
            .find(|item| item.id == item_id))
    }
}

/// Fixed in-process catalog (demos, tests, offline snapshots)
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    restaurants: HashMap<String, (RestaurantInfo, Vec<MenuItem>)>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restaurant(mut self, restaurant: RestaurantInfo, menu: Vec<MenuItem>) -> Self {
        self.restaurants
            .insert(restaurant.id.clone(), (restaurant, menu));
        self
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn restaurant(&self, id: &str) -> ClientResult<Option<RestaurantInfo>> {
        Ok(self.restaurants.get(id).map(|(info, _)| info.clone()))
    }

    async fn menu(&self, restaurant_id: &str) -> ClientResult<Vec<MenuItem>> {
        Ok(self
            .restaurants
            .get(restaurant_id)
            .map(|(_, menu)| menu.clone())
            .unwrap_or_default())
    }
}
