//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. Rows live in ordered maps
//! behind a single lock; every write takes the write lock once, which makes it
//! atomic with respect to other requests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, PizzaId, Restaurant, RestaurantId,
    RestaurantPizza, RestaurantPizzaId,
};

/// In-memory local repository.
///
/// Cloning shares the underlying data.
///
/// # Example
/// ```
/// use pizzeria::db::repositories::LocalRepository;
/// use pizzeria::db::repository::RestaurantRepository;
/// use pizzeria::models::NewRestaurant;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = LocalRepository::new();
/// repo.insert_restaurant(&NewRestaurant::new("Kiki's Pizza", "address3"))
///     .await
///     .unwrap();
///
/// assert_eq!(repo.list_restaurants().await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    restaurants: BTreeMap<RestaurantId, Restaurant>,
    pizzas: BTreeMap<PizzaId, Pizza>,
    restaurant_pizzas: BTreeMap<RestaurantPizzaId, RestaurantPizza>,

    // ID counters
    next_restaurant_id: i64,
    next_pizza_id: i64,
    next_restaurant_pizza_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            restaurants: BTreeMap::new(),
            pizzas: BTreeMap::new(),
            restaurant_pizzas: BTreeMap::new(),
            next_restaurant_id: 1,
            next_pizza_id: 1,
            next_restaurant_pizza_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    /// Drop every association matching `predicate`, returning how many went.
    fn remove_associations(&mut self, predicate: impl Fn(&RestaurantPizza) -> bool) -> usize {
        let before = self.restaurant_pizzas.len();
        self.restaurant_pizzas.retain(|_, rp| !predicate(rp));
        before - self.restaurant_pizzas.len()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy every operation except `health_check` fails with a
    /// connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository and restart identity counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn restaurant_count(&self) -> usize {
        self.data.read().restaurants.len()
    }

    pub fn pizza_count(&self) -> usize {
        self.data.read().pizzas.len()
    }

    pub fn restaurant_pizza_count(&self) -> usize {
        self.data.read().restaurant_pizzas.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RestaurantRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_restaurant(&self, restaurant: &NewRestaurant) -> RepositoryResult<Restaurant> {
        self.check_health("insert_restaurant")?;
        let mut data = self.data.write();
        let id = RestaurantId(data.next_restaurant_id);
        data.next_restaurant_id += 1;

        let row = Restaurant {
            id,
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
        };
        data.restaurants.insert(id, row.clone());
        Ok(row)
    }

    async fn get_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<Restaurant>> {
        self.check_health("get_restaurant")?;
        Ok(self.data.read().restaurants.get(&id).cloned())
    }

    async fn list_restaurants(&self) -> RepositoryResult<Vec<Restaurant>> {
        self.check_health("list_restaurants")?;
        Ok(self.data.read().restaurants.values().cloned().collect())
    }

    async fn delete_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<usize>> {
        self.check_health("delete_restaurant")?;
        let mut data = self.data.write();
        if data.restaurants.remove(&id).is_none() {
            return Ok(None);
        }
        Ok(Some(data.remove_associations(|rp| rp.restaurant_id == id)))
    }
}

#[async_trait]
impl PizzaRepository for LocalRepository {
    async fn insert_pizza(&self, pizza: &NewPizza) -> RepositoryResult<Pizza> {
        self.check_health("insert_pizza")?;
        let mut data = self.data.write();
        let id = PizzaId(data.next_pizza_id);
        data.next_pizza_id += 1;

        let row = Pizza {
            id,
            name: pizza.name.clone(),
            ingredients: pizza.ingredients.clone(),
        };
        data.pizzas.insert(id, row.clone());
        Ok(row)
    }

    async fn get_pizza(&self, id: PizzaId) -> RepositoryResult<Option<Pizza>> {
        self.check_health("get_pizza")?;
        Ok(self.data.read().pizzas.get(&id).cloned())
    }

    async fn list_pizzas(&self) -> RepositoryResult<Vec<Pizza>> {
        self.check_health("list_pizzas")?;
        Ok(self.data.read().pizzas.values().cloned().collect())
    }

    async fn delete_pizza(&self, id: PizzaId) -> RepositoryResult<Option<usize>> {
        self.check_health("delete_pizza")?;
        let mut data = self.data.write();
        if data.pizzas.remove(&id).is_none() {
            return Ok(None);
        }
        Ok(Some(data.remove_associations(|rp| rp.pizza_id == id)))
    }
}

#[async_trait]
impl RestaurantPizzaRepository for LocalRepository {
    async fn insert_restaurant_pizza(
        &self,
        restaurant_pizza: &NewRestaurantPizza,
    ) -> RepositoryResult<RestaurantPizza> {
        const OPERATION: &str = "insert_restaurant_pizza";
        self.check_health(OPERATION)?;
        let mut data = self.data.write();

        // Same guarantee a foreign key gives: no dangling associations.
        if !data.restaurants.contains_key(&restaurant_pizza.restaurant_id) {
            return Err(RepositoryError::missing_entity(
                OPERATION,
                "Restaurant",
                restaurant_pizza.restaurant_id,
            ));
        }
        if !data.pizzas.contains_key(&restaurant_pizza.pizza_id) {
            return Err(RepositoryError::missing_entity(
                OPERATION,
                "Pizza",
                restaurant_pizza.pizza_id,
            ));
        }

        let id = RestaurantPizzaId(data.next_restaurant_pizza_id);
        data.next_restaurant_pizza_id += 1;

        let row = restaurant_pizza.into_entity(id);
        data.restaurant_pizzas.insert(id, row.clone());
        Ok(row)
    }

    async fn get_restaurant_pizza(
        &self,
        id: RestaurantPizzaId,
    ) -> RepositoryResult<Option<RestaurantPizza>> {
        self.check_health("get_restaurant_pizza")?;
        Ok(self.data.read().restaurant_pizzas.get(&id).cloned())
    }

    async fn list_restaurant_pizzas(&self) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.check_health("list_restaurant_pizzas")?;
        Ok(self.data.read().restaurant_pizzas.values().cloned().collect())
    }

    async fn list_restaurant_pizzas_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.check_health("list_restaurant_pizzas_for_restaurant")?;
        Ok(self
            .data
            .read()
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.restaurant_id == restaurant_id)
            .cloned()
            .collect())
    }

    async fn list_restaurant_pizzas_for_pizza(
        &self,
        pizza_id: PizzaId,
    ) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.check_health("list_restaurant_pizzas_for_pizza")?;
        Ok(self
            .data
            .read()
            .restaurant_pizzas
            .values()
            .filter(|rp| rp.pizza_id == pizza_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;

    async fn seeded() -> (LocalRepository, Restaurant, Pizza) {
        let repo = LocalRepository::new();
        let restaurant = repo
            .insert_restaurant(&NewRestaurant::new("Sanjay's Pizza", "address2"))
            .await
            .unwrap();
        let pizza = repo
            .insert_pizza(&NewPizza::new("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"))
            .await
            .unwrap();
        (repo, restaurant, pizza)
    }

    fn link(price: i64, restaurant: &Restaurant, pizza: &Pizza) -> NewRestaurantPizza {
        NewRestaurantPizza::new(Price::new(price).unwrap(), restaurant.id, pizza.id)
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_pizzas().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_identities_are_assigned_in_sequence() {
        let repo = LocalRepository::new();
        let a = repo.insert_restaurant(&NewRestaurant::new("a", "x")).await.unwrap();
        let b = repo.insert_restaurant(&NewRestaurant::new("b", "y")).await.unwrap();
        assert_eq!(a.id, RestaurantId(1));
        assert_eq!(b.id, RestaurantId(2));

        let listed = repo.list_restaurants().await.unwrap();
        assert_eq!(listed, vec![a, b]);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = LocalRepository::new();
        assert!(repo.get_restaurant(RestaurantId(9)).await.unwrap().is_none());
        assert!(repo.get_pizza(PizzaId(9)).await.unwrap().is_none());
        assert!(repo
            .get_restaurant_pizza(RestaurantPizzaId(9))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_restaurant_cascades() {
        let (repo, restaurant, pizza) = seeded().await;
        let other = repo
            .insert_restaurant(&NewRestaurant::new("Kiki's Pizza", "address3"))
            .await
            .unwrap();
        repo.insert_restaurant_pizza(&link(5, &restaurant, &pizza)).await.unwrap();
        repo.insert_restaurant_pizza(&link(6, &restaurant, &pizza)).await.unwrap();
        repo.insert_restaurant_pizza(&link(7, &other, &pizza)).await.unwrap();

        let removed = repo.delete_restaurant(restaurant.id).await.unwrap();
        assert_eq!(removed, Some(2));
        assert!(repo.get_restaurant(restaurant.id).await.unwrap().is_none());

        let remaining = repo.list_restaurant_pizzas().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].restaurant_id, other.id);
        // The pizza itself is not owned by the restaurant.
        assert!(repo.get_pizza(pizza.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pizza_cascades() {
        let (repo, restaurant, pizza) = seeded().await;
        repo.insert_restaurant_pizza(&link(5, &restaurant, &pizza)).await.unwrap();

        assert_eq!(repo.delete_pizza(pizza.id).await.unwrap(), Some(1));
        assert_eq!(repo.restaurant_pizza_count(), 0);
        assert_eq!(repo.restaurant_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_none() {
        let repo = LocalRepository::new();
        assert_eq!(repo.delete_restaurant(RestaurantId(1)).await.unwrap(), None);
        assert_eq!(repo.delete_pizza(PizzaId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_association_requires_existing_rows() {
        let (repo, restaurant, pizza) = seeded().await;

        let dangling_restaurant =
            NewRestaurantPizza::new(Price::new(5).unwrap(), RestaurantId(99), pizza.id);
        let err = repo
            .insert_restaurant_pizza(&dangling_restaurant)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(err.message(), "Restaurant not found");

        let dangling_pizza =
            NewRestaurantPizza::new(Price::new(5).unwrap(), restaurant.id, PizzaId(99));
        let err = repo.insert_restaurant_pizza(&dangling_pizza).await.unwrap_err();
        assert_eq!(err.message(), "Pizza not found");

        assert_eq!(repo.restaurant_pizza_count(), 0);
    }

    #[tokio::test]
    async fn test_association_listings_filter_by_owner() {
        let (repo, restaurant, pizza) = seeded().await;
        let second_pizza = repo.insert_pizza(&NewPizza::new("Emma", "Dough")).await.unwrap();
        repo.insert_restaurant_pizza(&link(5, &restaurant, &pizza)).await.unwrap();
        repo.insert_restaurant_pizza(&link(8, &restaurant, &second_pizza)).await.unwrap();

        let for_restaurant = repo
            .list_restaurant_pizzas_for_restaurant(restaurant.id)
            .await
            .unwrap();
        assert_eq!(for_restaurant.len(), 2);

        let for_pizza = repo
            .list_restaurant_pizzas_for_pizza(second_pizza.id)
            .await
            .unwrap();
        assert_eq!(for_pizza.len(), 1);
        assert_eq!(for_pizza[0].price().value(), 8);
    }

    #[tokio::test]
    async fn test_clear_resets_counters() {
        let (repo, _, _) = seeded().await;
        repo.clear();
        assert_eq!(repo.restaurant_count(), 0);
        let again = repo.insert_restaurant(&NewRestaurant::new("a", "b")).await.unwrap();
        assert_eq!(again.id, RestaurantId(1));
    }
}
