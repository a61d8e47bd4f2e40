//! Loaded entity rows and the relationship metadata the serializer walks.
//!
//! Each entity kind declares its columns and relationships explicitly through
//! [`Entity`]; [`EntityGraph`] resolves a relationship name to the related rows
//! it holds.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{Pizza, PizzaId, Restaurant, RestaurantId, RestaurantPizza, RestaurantPizzaId};

/// Statically declared serialization metadata for one entity kind.
pub trait Entity {
    /// Runtime type name, half of the cycle-guard key.
    const TYPE_NAME: &'static str;
    /// Relationship names in output order.
    const RELATIONSHIPS: &'static [&'static str];

    fn identity(&self) -> i64;

    /// Plain scalar columns, by field name.
    fn columns(&self) -> Vec<(&'static str, Value)>;

    /// Resolve one of [`Entity::RELATIONSHIPS`] against `graph`.
    fn related<'g>(&self, name: &str, graph: &'g EntityGraph) -> Option<Related<'g>>;
}

/// Borrowed handle to any entity held by an [`EntityGraph`].
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'g> {
    Restaurant(&'g Restaurant),
    Pizza(&'g Pizza),
    RestaurantPizza(&'g RestaurantPizza),
}

/// Target of a relationship.
#[derive(Debug, Clone)]
pub enum Related<'g> {
    /// Singular back-reference; `None` when the referenced row is not loaded.
    One(Option<EntityRef<'g>>),
    /// Owned collection.
    Many(Vec<EntityRef<'g>>),
}

impl<'g> EntityRef<'g> {
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityRef::Restaurant(_) => Restaurant::TYPE_NAME,
            EntityRef::Pizza(_) => Pizza::TYPE_NAME,
            EntityRef::RestaurantPizza(_) => RestaurantPizza::TYPE_NAME,
        }
    }

    pub fn identity(&self) -> i64 {
        match self {
            EntityRef::Restaurant(e) => e.identity(),
            EntityRef::Pizza(e) => e.identity(),
            EntityRef::RestaurantPizza(e) => e.identity(),
        }
    }

    pub fn columns(&self) -> Vec<(&'static str, Value)> {
        match self {
            EntityRef::Restaurant(e) => e.columns(),
            EntityRef::Pizza(e) => e.columns(),
            EntityRef::RestaurantPizza(e) => e.columns(),
        }
    }

    pub fn relationships(&self) -> &'static [&'static str] {
        match self {
            EntityRef::Restaurant(_) => Restaurant::RELATIONSHIPS,
            EntityRef::Pizza(_) => Pizza::RELATIONSHIPS,
            EntityRef::RestaurantPizza(_) => RestaurantPizza::RELATIONSHIPS,
        }
    }

    pub fn related(&self, name: &str, graph: &'g EntityGraph) -> Option<Related<'g>> {
        match self {
            EntityRef::Restaurant(e) => e.related(name, graph),
            EntityRef::Pizza(e) => e.related(name, graph),
            EntityRef::RestaurantPizza(e) => e.related(name, graph),
        }
    }
}

/// Rows loaded for one request, keyed by identity.
///
/// Collections resolve in ascending identity order.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    restaurants: BTreeMap<RestaurantId, Restaurant>,
    pizzas: BTreeMap<PizzaId, Pizza>,
    restaurant_pizzas: BTreeMap<RestaurantPizzaId, RestaurantPizza>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_restaurant(&mut self, restaurant: Restaurant) {
        self.restaurants.insert(restaurant.id, restaurant);
    }

    pub fn add_pizza(&mut self, pizza: Pizza) {
        self.pizzas.insert(pizza.id, pizza);
    }

    pub fn add_restaurant_pizza(&mut self, restaurant_pizza: RestaurantPizza) {
        self.restaurant_pizzas
            .insert(restaurant_pizza.id, restaurant_pizza);
    }

    pub fn restaurant(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurants.get(&id)
    }

    pub fn pizza(&self, id: PizzaId) -> Option<&Pizza> {
        self.pizzas.get(&id)
    }

    pub fn restaurant_pizza(&self, id: RestaurantPizzaId) -> Option<&RestaurantPizza> {
        self.restaurant_pizzas.get(&id)
    }

    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.restaurants.values()
    }

    pub fn pizzas(&self) -> impl Iterator<Item = &Pizza> {
        self.pizzas.values()
    }

    pub fn restaurant_pizzas(&self) -> impl Iterator<Item = &RestaurantPizza> {
        self.restaurant_pizzas.values()
    }

    fn associations_where(
        &self,
        predicate: impl Fn(&RestaurantPizza) -> bool,
    ) -> Vec<EntityRef<'_>> {
        self.restaurant_pizzas
            .values()
            .filter(|rp| predicate(rp))
            .map(EntityRef::RestaurantPizza)
            .collect()
    }
}

impl Entity for Restaurant {
    const TYPE_NAME: &'static str = "Restaurant";
    const RELATIONSHIPS: &'static [&'static str] = &["restaurant_pizzas"];

    fn identity(&self) -> i64 {
        self.id.value()
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id.value())),
            ("name", Value::from(self.name.clone())),
            ("address", Value::from(self.address.clone())),
        ]
    }

    fn related<'g>(&self, name: &str, graph: &'g EntityGraph) -> Option<Related<'g>> {
        match name {
            "restaurant_pizzas" => Some(Related::Many(
                graph.associations_where(|rp| rp.restaurant_id == self.id),
            )),
            _ => None,
        }
    }
}

impl Entity for Pizza {
    const TYPE_NAME: &'static str = "Pizza";
    const RELATIONSHIPS: &'static [&'static str] = &["restaurant_pizzas"];

    fn identity(&self) -> i64 {
        self.id.value()
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id.value())),
            ("name", Value::from(self.name.clone())),
            ("ingredients", Value::from(self.ingredients.clone())),
        ]
    }

    fn related<'g>(&self, name: &str, graph: &'g EntityGraph) -> Option<Related<'g>> {
        match name {
            "restaurant_pizzas" => Some(Related::Many(
                graph.associations_where(|rp| rp.pizza_id == self.id),
            )),
            _ => None,
        }
    }
}

impl Entity for RestaurantPizza {
    const TYPE_NAME: &'static str = "RestaurantPizza";
    const RELATIONSHIPS: &'static [&'static str] = &["restaurant", "pizza"];

    fn identity(&self) -> i64 {
        self.id.value()
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id.value())),
            ("price", Value::from(self.price().value())),
            ("restaurant_id", Value::from(self.restaurant_id.value())),
            ("pizza_id", Value::from(self.pizza_id.value())),
        ]
    }

    fn related<'g>(&self, name: &str, graph: &'g EntityGraph) -> Option<Related<'g>> {
        match name {
            "restaurant" => Some(Related::One(
                graph.restaurant(self.restaurant_id).map(EntityRef::Restaurant),
            )),
            "pizza" => Some(Related::One(graph.pizza(self.pizza_id).map(EntityRef::Pizza))),
            _ => None,
        }
    }
}

impl<'g> From<&'g Restaurant> for EntityRef<'g> {
    fn from(value: &'g Restaurant) -> Self {
        EntityRef::Restaurant(value)
    }
}

impl<'g> From<&'g Pizza> for EntityRef<'g> {
    fn from(value: &'g Pizza) -> Self {
        EntityRef::Pizza(value)
    }
}

impl<'g> From<&'g RestaurantPizza> for EntityRef<'g> {
    fn from(value: &'g RestaurantPizza) -> Self {
        EntityRef::RestaurantPizza(value)
    }
}
