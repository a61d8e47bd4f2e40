//! Persisted entities and their insert payloads.

use serde::{Deserialize, Serialize};

use super::price::{Price, ValidationError};
use super::{PizzaId, RestaurantId, RestaurantPizzaId};

/// A restaurant. Owns its `RestaurantPizza` associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
}

/// A pizza. Owns its `RestaurantPizza` associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: PizzaId,
    pub name: String,
    pub ingredients: String,
}

/// A pizza offered by a restaurant at a given price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantPizza {
    pub id: RestaurantPizzaId,
    price: Price,
    pub restaurant_id: RestaurantId,
    pub pizza_id: PizzaId,
}

impl RestaurantPizza {
    pub fn new(
        id: RestaurantPizzaId,
        price: Price,
        restaurant_id: RestaurantId,
        pizza_id: PizzaId,
    ) -> Self {
        Self {
            id,
            price,
            restaurant_id,
            pizza_id,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Assign a new price.
    ///
    /// On error the previous price is kept.
    pub fn set_price(&mut self, value: i64) -> Result<(), ValidationError> {
        self.price = Price::new(value)?;
        Ok(())
    }
}

/// Insert payload for a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
}

impl NewRestaurant {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Insert payload for a pizza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPizza {
    pub name: String,
    pub ingredients: String,
}

impl NewPizza {
    pub fn new(name: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into(),
        }
    }
}

/// Insert payload for an association. Holding a [`Price`] means the value was
/// already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRestaurantPizza {
    pub price: Price,
    pub restaurant_id: RestaurantId,
    pub pizza_id: PizzaId,
}

impl NewRestaurantPizza {
    pub fn new(price: Price, restaurant_id: RestaurantId, pizza_id: PizzaId) -> Self {
        Self {
            price,
            restaurant_id,
            pizza_id,
        }
    }

    /// Attach the store-assigned identity.
    pub fn into_entity(self, id: RestaurantPizzaId) -> RestaurantPizza {
        RestaurantPizza::new(id, self.price, self.restaurant_id, self.pizza_id)
    }
}
