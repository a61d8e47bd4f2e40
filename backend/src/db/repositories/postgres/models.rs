use diesel::prelude::*;

use super::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    Pizza, PizzaId, Price, Restaurant, RestaurantId, RestaurantPizza, RestaurantPizzaId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurantRow {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pizzas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PizzaRow {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pizzas)]
pub struct NewPizzaRow {
    pub name: String,
    pub ingredients: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurant_pizzas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RestaurantPizzaRow {
    pub id: i64,
    pub price: i32,
    pub restaurant_id: i64,
    pub pizza_id: i64,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = restaurant_pizzas)]
pub struct NewRestaurantPizzaRow {
    pub price: i32,
    pub restaurant_id: i64,
    pub pizza_id: i64,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            id: RestaurantId(row.id),
            name: row.name,
            address: row.address,
        }
    }
}

impl From<PizzaRow> for Pizza {
    fn from(row: PizzaRow) -> Self {
        Pizza {
            id: PizzaId(row.id),
            name: row.name,
            ingredients: row.ingredients,
        }
    }
}

impl TryFrom<RestaurantPizzaRow> for RestaurantPizza {
    type Error = RepositoryError;

    /// The CHECK constraint keeps stored prices valid; a row that still fails
    /// is reported as corrupt rather than silently clamped.
    fn try_from(row: RestaurantPizzaRow) -> RepositoryResult<Self> {
        let price = Price::try_from(row.price).map_err(|e| {
            RepositoryError::internal_with_context(
                e.to_string(),
                ErrorContext::new("load_restaurant_pizza")
                    .with_entity("RestaurantPizza")
                    .with_entity_id(row.id),
            )
        })?;
        Ok(RestaurantPizza::new(
            RestaurantPizzaId(row.id),
            price,
            RestaurantId(row.restaurant_id),
            PizzaId(row.pizza_id),
        ))
    }
}

pub fn rows_to_restaurant_pizzas(
    rows: Vec<RestaurantPizzaRow>,
) -> RepositoryResult<Vec<RestaurantPizza>> {
    rows.into_iter().map(RestaurantPizza::try_from).collect()
}
