//! Persistence operations for the restaurant/pizza association.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewRestaurantPizza, PizzaId, RestaurantId, RestaurantPizza, RestaurantPizzaId};

#[async_trait]
pub trait RestaurantPizzaRepository: Send + Sync {
    /// Insert an association and return it with its assigned identity.
    ///
    /// # Errors
    /// * `RepositoryError::NotFound` - referenced restaurant or pizza does not exist
    /// * `RepositoryError::ValidationError` - the store rejected the row
    async fn insert_restaurant_pizza(
        &self,
        restaurant_pizza: &NewRestaurantPizza,
    ) -> RepositoryResult<RestaurantPizza>;

    async fn get_restaurant_pizza(
        &self,
        id: RestaurantPizzaId,
    ) -> RepositoryResult<Option<RestaurantPizza>>;

    async fn list_restaurant_pizzas(&self) -> RepositoryResult<Vec<RestaurantPizza>>;

    async fn list_restaurant_pizzas_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> RepositoryResult<Vec<RestaurantPizza>>;

    async fn list_restaurant_pizzas_for_pizza(
        &self,
        pizza_id: PizzaId,
    ) -> RepositoryResult<Vec<RestaurantPizza>>;
}
