//! HTTP handlers for the REST API.
//!
//! Each handler is one-shot: load what the request needs through the
//! service layer, shape it, and return it. Nothing is kept between requests.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::dto::{CreateRestaurantPizzaRequest, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{NewRestaurantPizza, RestaurantId};
use crate::serializer::shapes::{pizza_json, restaurant_json, restaurant_pizza_json};
use crate::serializer::EntityGraph;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// A segment that is not an `i64` names no restaurant, so it is a 404.
fn restaurant_id(path: Result<Path<i64>, PathRejection>) -> Result<RestaurantId, AppError> {
    let Path(id) = path.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "non-integer restaurant id");
        AppError::restaurant_not_found()
    })?;
    Ok(RestaurantId(id))
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html("<h1>Code challenge</h1>")
}

/// GET /health
///
/// Reports the crate version and whether the store answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Restaurants
// =============================================================================

/// GET /restaurants
pub async fn list_restaurants(State(state): State<AppState>) -> HandlerResult<Vec<Value>> {
    let graph = db_services::load_restaurants_graph(state.repository.as_ref()).await?;
    let body = graph
        .restaurants()
        .map(|restaurant| restaurant_json(restaurant, &graph))
        .collect();
    Ok(Json(body))
}

/// GET /restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<Value> {
    let id = restaurant_id(path)?;
    let graph = db_services::load_restaurant_graph(state.repository.as_ref(), id)
        .await?
        .ok_or_else(AppError::restaurant_not_found)?;
    let restaurant = graph
        .restaurant(id)
        .ok_or_else(AppError::restaurant_not_found)?;
    Ok(Json(restaurant_json(restaurant, &graph)))
}

/// DELETE /restaurants/{id}
///
/// Removes the restaurant and every association that references it.
pub async fn delete_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = restaurant_id(path)?;
    if !db_services::delete_restaurant(state.repository.as_ref(), id).await? {
        return Err(AppError::restaurant_not_found());
    }
    info!(restaurant_id = %id, "deleted restaurant");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Pizzas
// =============================================================================

/// GET /pizzas
pub async fn list_pizzas(State(state): State<AppState>) -> HandlerResult<Vec<Value>> {
    let graph = db_services::load_pizzas_graph(state.repository.as_ref()).await?;
    let body = graph.pizzas().map(|pizza| pizza_json(pizza, &graph)).collect();
    Ok(Json(body))
}

// =============================================================================
// Restaurant pizzas
// =============================================================================

/// POST /restaurant_pizzas
///
/// Responds 201 with the flat association. An out-of-range price is rejected
/// before anything is written.
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: Result<Json<CreateRestaurantPizzaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload.inspect_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected restaurant_pizza body");
    })?;

    let new = NewRestaurantPizza::try_from(request).inspect_err(|e| {
        warn!(error = %e, "rejected restaurant_pizza price");
    })?;

    let created = db_services::create_restaurant_pizza(state.repository.as_ref(), &new)
        .await
        .inspect_err(|e| warn!(error = %e, "restaurant_pizza not created"))?;
    info!(
        restaurant_pizza_id = %created.id,
        restaurant_id = %created.restaurant_id,
        pizza_id = %created.pizza_id,
        "created restaurant_pizza"
    );

    // The flat shape never follows relationships, so an empty graph suffices.
    let graph = EntityGraph::new();
    Ok((
        StatusCode::CREATED,
        Json(restaurant_pizza_json(&created, &graph)),
    ))
}
