//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers. The rules that
//! must hold regardless of backend live here: graph loading for the
//! serializer, referential checks before an association is written, and the
//! demo data set.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers (http/handlers.rs)            │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  Service layer (services.rs)                 │
//! │  - EntityGraph loading                       │
//! │  - Referential checks on create              │
//! │  - Demo data seeding                         │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  Repository traits (repository/)             │
//! └──────────────────┬───────────────────────────┘
//!          ┌─────────┴──────────┐
//!   ┌──────▼───────┐    ┌───────▼──────┐
//!   │ Postgres     │    │ Local        │
//!   │ (Diesel)     │    │ (in-memory)  │
//!   └──────────────┘    └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use pizzeria::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     services::seed_demo_data(&repo).await?;
//!
//!     let graph = services::load_restaurants_graph(&repo).await?;
//!     println!("Loaded {} restaurants", graph.restaurants().count());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, PizzaId, Price, RestaurantId, RestaurantPizza,
};
use crate::serializer::EntityGraph;

// ==================== Health & Connection ====================

/// Check if the backing store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Graph Loading ====================

/// Load one restaurant together with its associations and their pizzas.
///
/// Returns `Ok(None)` when the restaurant does not exist.
pub async fn load_restaurant_graph<R: FullRepository + ?Sized>(
    repo: &R,
    id: RestaurantId,
) -> RepositoryResult<Option<EntityGraph>> {
    let Some(restaurant) = repo.get_restaurant(id).await? else {
        return Ok(None);
    };

    let mut graph = EntityGraph::new();
    graph.add_restaurant(restaurant);
    for restaurant_pizza in repo.list_restaurant_pizzas_for_restaurant(id).await? {
        if graph.pizza(restaurant_pizza.pizza_id).is_none() {
            if let Some(pizza) = repo.get_pizza(restaurant_pizza.pizza_id).await? {
                graph.add_pizza(pizza);
            }
        }
        graph.add_restaurant_pizza(restaurant_pizza);
    }
    Ok(Some(graph))
}

/// Load every restaurant, pizza and association.
pub async fn load_restaurants_graph<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<EntityGraph> {
    let mut graph = EntityGraph::new();
    for restaurant in repo.list_restaurants().await? {
        graph.add_restaurant(restaurant);
    }
    for pizza in repo.list_pizzas().await? {
        graph.add_pizza(pizza);
    }
    for restaurant_pizza in repo.list_restaurant_pizzas().await? {
        graph.add_restaurant_pizza(restaurant_pizza);
    }
    Ok(graph)
}

/// Load every pizza. Associations are left out since the pizza listing never
/// renders them.
pub async fn load_pizzas_graph<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<EntityGraph> {
    let mut graph = EntityGraph::new();
    for pizza in repo.list_pizzas().await? {
        graph.add_pizza(pizza);
    }
    Ok(graph)
}

// ==================== Writes ====================

/// Create a priced association after checking both referenced rows exist.
///
/// # Errors
/// * `NotFound` with message `"Restaurant not found"` or `"Pizza not found"`
///   when a referenced row is absent. The restaurant is checked first.
pub async fn create_restaurant_pizza<R: FullRepository + ?Sized>(
    repo: &R,
    new: &NewRestaurantPizza,
) -> RepositoryResult<RestaurantPizza> {
    const OPERATION: &str = "create_restaurant_pizza";

    if repo.get_restaurant(new.restaurant_id).await?.is_none() {
        return Err(RepositoryError::missing_entity(
            OPERATION,
            "Restaurant",
            new.restaurant_id,
        ));
    }
    if repo.get_pizza(new.pizza_id).await?.is_none() {
        return Err(RepositoryError::missing_entity(
            OPERATION,
            "Pizza",
            new.pizza_id,
        ));
    }

    let created = repo.insert_restaurant_pizza(new).await?;
    debug!(
        "Created restaurant_pizza {} (restaurant={}, pizza={}, price={})",
        created.id,
        created.restaurant_id,
        created.pizza_id,
        created.price()
    );
    Ok(created)
}

/// Delete a restaurant and its associations.
///
/// Returns `Ok(false)` when the restaurant does not exist.
pub async fn delete_restaurant<R: FullRepository + ?Sized>(
    repo: &R,
    id: RestaurantId,
) -> RepositoryResult<bool> {
    match repo.delete_restaurant(id).await? {
        Some(cascaded) => {
            debug!(
                "Deleted restaurant {} with {} restaurant_pizzas",
                id, cascaded
            );
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Delete a pizza and its associations.
///
/// Returns `Ok(false)` when the pizza does not exist.
pub async fn delete_pizza<R: FullRepository + ?Sized>(
    repo: &R,
    id: PizzaId,
) -> RepositoryResult<bool> {
    match repo.delete_pizza(id).await? {
        Some(cascaded) => {
            debug!("Deleted pizza {} with {} restaurant_pizzas", id, cascaded);
            Ok(true)
        }
        None => Ok(false),
    }
}

// ==================== Demo Data ====================

/// Counts of rows written by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub restaurant_pizzas: usize,
}

const DEMO_RESTAURANTS: [(&str, &str); 3] = [
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const DEMO_PIZZAS: [(&str, &str); 3] = [
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

/// `(restaurant index, pizza index, price)` into the two tables above.
const DEMO_MENU: [(usize, usize, i64); 5] = [
    (0, 0, 1),
    (0, 1, 4),
    (1, 1, 10),
    (1, 2, 12),
    (2, 0, 15),
];

/// Insert a small demo data set through the validated write path.
///
/// Rows are appended; existing data is left alone.
pub async fn seed_demo_data<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<SeedSummary> {
    let mut restaurant_ids = Vec::with_capacity(DEMO_RESTAURANTS.len());
    for (name, address) in DEMO_RESTAURANTS {
        let restaurant = repo
            .insert_restaurant(&NewRestaurant::new(name, address))
            .await?;
        restaurant_ids.push(restaurant.id);
    }

    let mut pizza_ids = Vec::with_capacity(DEMO_PIZZAS.len());
    for (name, ingredients) in DEMO_PIZZAS {
        let pizza = repo.insert_pizza(&NewPizza::new(name, ingredients)).await?;
        pizza_ids.push(pizza.id);
    }

    for (restaurant, pizza, price) in DEMO_MENU {
        let new = NewRestaurantPizza::new(
            Price::new(price)?,
            restaurant_ids[restaurant],
            pizza_ids[pizza],
        );
        create_restaurant_pizza(repo, &new).await?;
    }

    let summary = SeedSummary {
        restaurants: restaurant_ids.len(),
        pizzas: pizza_ids.len(),
        restaurant_pizzas: DEMO_MENU.len(),
    };
    info!(
        "Seeded demo data: {} restaurants, {} pizzas, {} restaurant_pizzas",
        summary.restaurants, summary.pizzas, summary.restaurant_pizzas
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::RestaurantRepository;

    #[tokio::test]
    async fn test_seed_demo_data_counts() {
        let repo = LocalRepository::new();
        let summary = seed_demo_data(&repo).await.unwrap();

        assert_eq!(summary.restaurants, 3);
        assert_eq!(repo.restaurant_count(), 3);
        assert_eq!(repo.pizza_count(), 3);
        assert_eq!(repo.restaurant_pizza_count(), DEMO_MENU.len());
    }

    #[tokio::test]
    async fn test_load_restaurant_graph_pulls_related_pizzas() {
        let repo = LocalRepository::new();
        seed_demo_data(&repo).await.unwrap();

        let graph = load_restaurant_graph(&repo, RestaurantId(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graph.restaurants().count(), 1);
        assert_eq!(graph.restaurant_pizzas().count(), 2);
        let names: Vec<&str> = graph.pizzas().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Geri", "Melanie"]);
    }

    #[tokio::test]
    async fn test_load_restaurant_graph_missing() {
        let repo = LocalRepository::new();
        assert!(load_restaurant_graph(&repo, RestaurantId(9))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_restaurant_pizza_checks_references() {
        let repo = LocalRepository::new();
        let restaurant = repo
            .insert_restaurant(&NewRestaurant::new("Solo", "1 Main St"))
            .await
            .unwrap();

        let new = NewRestaurantPizza::new(Price::new(5).unwrap(), restaurant.id, PizzaId(77));
        let err = create_restaurant_pizza(&repo, &new).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(err.message(), "Pizza not found");

        let new = NewRestaurantPizza::new(Price::new(5).unwrap(), RestaurantId(77), PizzaId(77));
        let err = create_restaurant_pizza(&repo, &new).await.unwrap_err();
        assert_eq!(err.message(), "Restaurant not found");
        assert_eq!(repo.restaurant_pizza_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_restaurant_cascades() {
        let repo = LocalRepository::new();
        seed_demo_data(&repo).await.unwrap();

        assert!(delete_restaurant(&repo, RestaurantId(1)).await.unwrap());
        assert_eq!(repo.restaurant_pizza_count(), DEMO_MENU.len() - 2);
        assert!(!delete_restaurant(&repo, RestaurantId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_pizza_cascades() {
        let repo = LocalRepository::new();
        seed_demo_data(&repo).await.unwrap();

        // Emma appears on two menus.
        assert!(delete_pizza(&repo, PizzaId(1)).await.unwrap());
        assert_eq!(repo.restaurant_pizza_count(), DEMO_MENU.len() - 2);
        assert_eq!(repo.restaurant_count(), 3);
    }
}
