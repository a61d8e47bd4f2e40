//! Entity model: restaurants, pizzas and the priced association between them.

pub mod entities;
pub mod macros;
pub mod price;

crate::define_id_types!(i64 => RestaurantId, PizzaId, RestaurantPizzaId);

pub use entities::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza};
pub use price::{validate_price, Price, ValidationError, MAX_PRICE, MIN_PRICE};
