//! Pizza persistence operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewPizza, Pizza, PizzaId};

#[async_trait]
pub trait PizzaRepository: Send + Sync {
    /// Insert a pizza and return it with its assigned identity.
    async fn insert_pizza(&self, pizza: &NewPizza) -> RepositoryResult<Pizza>;

    /// Fetch a pizza, `Ok(None)` if absent.
    async fn get_pizza(&self, id: PizzaId) -> RepositoryResult<Option<Pizza>>;

    async fn list_pizzas(&self) -> RepositoryResult<Vec<Pizza>>;

    /// Delete a pizza together with all of its associations.
    ///
    /// Returns the number of associations removed, `None` if the pizza was absent.
    async fn delete_pizza(&self, id: PizzaId) -> RepositoryResult<Option<usize>>;
}
