//! Request and response bodies that are not entity shapes.
//!
//! Entity output goes through `serializer::shapes`; only the create request,
//! the health report and the two error envelopes are declared here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{NewRestaurantPizza, PizzaId, Price, RestaurantId, ValidationError};

/// Body of `POST /restaurant_pizzas`.
///
/// `price` is kept as raw JSON. Any value that is not an integer in range,
/// including ones that do not fit in an `i64`, fails with the price message
/// rather than a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurantPizzaRequest {
    pub price: Value,
    pub pizza_id: i64,
    pub restaurant_id: i64,
}

impl TryFrom<CreateRestaurantPizzaRequest> for NewRestaurantPizza {
    type Error = ValidationError;

    fn try_from(req: CreateRestaurantPizzaRequest) -> Result<Self, Self::Error> {
        Ok(NewRestaurantPizza::new(
            price_from_json(&req.price)?,
            RestaurantId(req.restaurant_id),
            PizzaId(req.pizza_id),
        ))
    }
}

/// Integral numbers saturate to the `i64` range before validation. Fractions
/// and non-numbers are rejected outright.
fn price_from_json(value: &Value) -> Result<Price, ValidationError> {
    let Value::Number(number) = value else {
        return Err(ValidationError::PriceOutOfRange(0));
    };
    if let Some(v) = number.as_i64() {
        return Price::new(v);
    }
    if number.is_u64() {
        return Price::new(i64::MAX);
    }
    match number.as_f64() {
        Some(v) if v.fract() == 0.0 => Price::new(v as i64),
        Some(v) => Err(ValidationError::PriceOutOfRange(v as i64)),
        None => Err(ValidationError::PriceOutOfRange(0)),
    }
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `disconnected` or `error: <message>`.
    pub database: String,
}

/// `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"errors": ["..."]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsBody {
    pub errors: Vec<String>,
}
