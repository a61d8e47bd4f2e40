//! PostgreSQL backend tests.
//!
//! Run with `--features postgres-repo` and a reachable database in
//! `DATABASE_URL`. Without a URL every test returns early. Tests share the
//! database, so assertions are made on the rows each test creates.
#![cfg(feature = "postgres-repo")]

use std::sync::Arc;

use pizzeria::db::services;
use pizzeria::db::{
    PizzaRepository, PostgresConfig, PostgresRepository, RepositoryError, RepositoryFactory,
    RestaurantPizzaRepository, RestaurantRepository,
};
use pizzeria::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Price, RestaurantId};

async fn repo_or_skip() -> Option<Arc<PostgresRepository>> {
    let config = match PostgresConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("Skipping Postgres test: no database URL set");
            return None;
        }
    };
    Some(RepositoryFactory::create_postgres(&config).await.unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let Some(repo) = repo_or_skip().await else {
        return;
    };
    assert!(repo.health_check().await.unwrap());
    assert!(repo.get_pool_stats().max_size >= 1);
}

#[tokio::test]
async fn test_insert_get_and_cascade_delete() {
    let Some(repo) = repo_or_skip().await else {
        return;
    };

    let restaurant = repo
        .insert_restaurant(&NewRestaurant::new("PG Pizzeria", "1 Row Lane"))
        .await
        .unwrap();
    let pizza = repo
        .insert_pizza(&NewPizza::new("PG Special", "Dough, Cheese"))
        .await
        .unwrap();
    let rp = repo
        .insert_restaurant_pizza(&NewRestaurantPizza::new(
            Price::new(20).unwrap(),
            restaurant.id,
            pizza.id,
        ))
        .await
        .unwrap();

    assert_eq!(
        repo.get_restaurant(restaurant.id).await.unwrap().as_ref(),
        Some(&restaurant)
    );
    assert_eq!(
        repo.list_restaurant_pizzas_for_restaurant(restaurant.id)
            .await
            .unwrap(),
        vec![rp.clone()]
    );

    assert_eq!(repo.delete_restaurant(restaurant.id).await.unwrap(), Some(1));
    assert!(repo.get_restaurant(restaurant.id).await.unwrap().is_none());
    assert!(repo.get_restaurant_pizza(rp.id).await.unwrap().is_none());
    assert_eq!(repo.delete_restaurant(restaurant.id).await.unwrap(), None);

    assert_eq!(repo.delete_pizza(pizza.id).await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_insert_with_missing_restaurant_is_not_found() {
    let Some(repo) = repo_or_skip().await else {
        return;
    };
    let pizza = repo
        .insert_pizza(&NewPizza::new("Orphan", "Dough"))
        .await
        .unwrap();

    let err = repo
        .insert_restaurant_pizza(&NewRestaurantPizza::new(
            Price::new(5).unwrap(),
            RestaurantId(i64::MAX),
            pizza.id,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(err.message(), "Restaurant not found");

    repo.delete_pizza(pizza.id).await.unwrap();
}

#[tokio::test]
async fn test_restaurant_graph_loads_from_postgres() {
    let Some(repo) = repo_or_skip().await else {
        return;
    };
    let restaurant = repo
        .insert_restaurant(&NewRestaurant::new("Graph House", "2 Join St"))
        .await
        .unwrap();

    let graph = services::load_restaurant_graph(repo.as_ref(), restaurant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(graph.restaurant(restaurant.id), Some(&restaurant));
    assert_eq!(graph.restaurant_pizzas().count(), 0);

    repo.delete_restaurant(restaurant.id).await.unwrap();
}
