//! Restaurant persistence operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewRestaurant, Restaurant, RestaurantId};

/// Repository trait for restaurants.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a restaurant and return it with its assigned identity.
    async fn insert_restaurant(&self, restaurant: &NewRestaurant) -> RepositoryResult<Restaurant>;

    /// Fetch a restaurant, `Ok(None)` if absent.
    async fn get_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<Restaurant>>;

    async fn list_restaurants(&self) -> RepositoryResult<Vec<Restaurant>>;

    /// Delete a restaurant together with all of its associations.
    ///
    /// # Returns
    /// * `Ok(Some(n))` - deleted, `n` associations removed with it
    /// * `Ok(None)` - no restaurant with that identity
    async fn delete_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<usize>>;
}
