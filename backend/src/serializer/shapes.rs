//! Per-entity output shapes used by the HTTP endpoints.
//!
//! - Pizza: `{id, name, ingredients}`.
//! - RestaurantPizza: `{id, price, restaurant_id, pizza_id}`.
//! - Restaurant: `{id, name, address, restaurant_pizzas: [...]}` with each
//!   association carrying its flat `pizza`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{serialize, EntityGraph};
use crate::models::{Pizza, Restaurant, RestaurantPizza};

/// Relationship paths to leave out of the serialized output.
///
/// Paths are dotted and relative to the root entity; collection members do
/// not add a segment, so `restaurant_pizzas.pizza` names the `pizza` key of
/// every element of the root's `restaurant_pizzas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    exclude: &'static [&'static str],
}

impl Shape {
    /// No exclusions: the full recursive shape.
    pub const FULL: Shape = Shape::new(&[]);

    pub const RESTAURANT: Shape = Shape::new(&[
        "restaurant_pizzas.restaurant",
        "restaurant_pizzas.pizza.restaurant_pizzas",
    ]);

    pub const PIZZA: Shape = Shape::new(&["restaurant_pizzas"]);

    pub const RESTAURANT_PIZZA: Shape = Shape::new(&["restaurant", "pizza"]);

    pub const fn new(exclude: &'static [&'static str]) -> Self {
        Self { exclude }
    }

    pub fn excludes(&self, path: &str) -> bool {
        self.exclude.iter().any(|p| *p == path)
    }
}

fn shaped(out: Option<Map<String, Value>>) -> Value {
    out.map(Value::Object).unwrap_or(Value::Null)
}

/// Restaurant with its associations and each association's pizza.
pub fn restaurant_json(restaurant: &Restaurant, graph: &EntityGraph) -> Value {
    shaped(serialize(
        restaurant.into(),
        graph,
        &Shape::RESTAURANT,
        &mut HashSet::new(),
    ))
}

/// Pizza scalars only.
pub fn pizza_json(pizza: &Pizza, graph: &EntityGraph) -> Value {
    shaped(serialize(pizza.into(), graph, &Shape::PIZZA, &mut HashSet::new()))
}

/// Association scalars only; foreign keys, no nested objects.
pub fn restaurant_pizza_json(restaurant_pizza: &RestaurantPizza, graph: &EntityGraph) -> Value {
    shaped(serialize(
        restaurant_pizza.into(),
        graph,
        &Shape::RESTAURANT_PIZZA,
        &mut HashSet::new(),
    ))
}
