//! Repository trait definitions for the persistence gateway.
//!
//! The gateway is split per entity so backends stay focused:
//!
//! - [`error`]: Error types for repository operations
//! - [`restaurant`]: restaurants, plus the health probe
//! - [`pizza`]: pizzas
//! - [`restaurant_pizza`]: priced associations
//!
//! Each write is atomic: it either fully applies or leaves the store
//! untouched. Listings are ordered by ascending identity.
//!
//! # Convenience Trait Bound
//!
//! Functions that need the whole gateway take [`FullRepository`]:
//!
//! ```ignore
//! async fn count_menu<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<usize> {
//!     Ok(repo.list_restaurant_pizzas().await?.len())
//! }
//! ```

pub mod error;
pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use pizza::PizzaRepository;
pub use restaurant::RestaurantRepository;
pub use restaurant_pizza::RestaurantPizzaRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: RestaurantRepository + PizzaRepository + RestaurantPizzaRepository {}

// Blanket implementation: any type implementing all three traits is a FullRepository
impl<T> FullRepository for T where
    T: RestaurantRepository + PizzaRepository + RestaurantPizzaRepository
{
}
