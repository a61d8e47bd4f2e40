//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution (cascading foreign keys, price CHECK)
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`, `PG_DATABASE_URL` or `DB_URI`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ErrorContext, PizzaRepository, RepositoryError, RepositoryResult, RestaurantPizzaRepository,
    RestaurantRepository,
};
use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, PizzaId, Restaurant, RestaurantId,
    RestaurantPizza, RestaurantPizzaId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the recognised variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .or_else(|_| std::env::var("DB_URI"))
            .map_err(|_| "DATABASE_URL, PG_DATABASE_URL or DB_URI must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation on the blocking pool, retrying transient
    /// failures with exponential backoff up to `max_retries` times.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and query counters.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl RestaurantRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_restaurant(&self, restaurant: &NewRestaurant) -> RepositoryResult<Restaurant> {
        let row = NewRestaurantRow {
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(restaurants::table)
                .values(&row)
                .returning(RestaurantRow::as_returning())
                .get_result::<RestaurantRow>(conn)
                .map(Restaurant::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<Restaurant>> {
        self.with_conn(move |conn| {
            restaurants::table
                .find(id.value())
                .select(RestaurantRow::as_select())
                .first::<RestaurantRow>(conn)
                .optional()
                .map(|row| row.map(Restaurant::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_restaurants(&self) -> RepositoryResult<Vec<Restaurant>> {
        self.with_conn(|conn| {
            restaurants::table
                .order(restaurants::id.asc())
                .select(RestaurantRow::as_select())
                .load::<RestaurantRow>(conn)
                .map(|rows| rows.into_iter().map(Restaurant::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_restaurant(&self, id: RestaurantId) -> RepositoryResult<Option<usize>> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let existing = restaurants::table
                    .find(id.value())
                    .select(restaurants::id)
                    .first::<i64>(tx)
                    .optional()?;
                if existing.is_none() {
                    return Ok(None);
                }

                // ON DELETE CASCADE would do this too; deleting explicitly
                // yields the count.
                let removed = diesel::delete(
                    restaurant_pizzas::table.filter(restaurant_pizzas::restaurant_id.eq(id.value())),
                )
                .execute(tx)?;
                diesel::delete(restaurants::table.find(id.value())).execute(tx)?;
                Ok(Some(removed))
            })
        })
        .await
    }
}

#[async_trait]
impl PizzaRepository for PostgresRepository {
    async fn insert_pizza(&self, pizza: &NewPizza) -> RepositoryResult<Pizza> {
        let row = NewPizzaRow {
            name: pizza.name.clone(),
            ingredients: pizza.ingredients.clone(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(pizzas::table)
                .values(&row)
                .returning(PizzaRow::as_returning())
                .get_result::<PizzaRow>(conn)
                .map(Pizza::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_pizza(&self, id: PizzaId) -> RepositoryResult<Option<Pizza>> {
        self.with_conn(move |conn| {
            pizzas::table
                .find(id.value())
                .select(PizzaRow::as_select())
                .first::<PizzaRow>(conn)
                .optional()
                .map(|row| row.map(Pizza::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_pizzas(&self) -> RepositoryResult<Vec<Pizza>> {
        self.with_conn(|conn| {
            pizzas::table
                .order(pizzas::id.asc())
                .select(PizzaRow::as_select())
                .load::<PizzaRow>(conn)
                .map(|rows| rows.into_iter().map(Pizza::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_pizza(&self, id: PizzaId) -> RepositoryResult<Option<usize>> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let existing = pizzas::table
                    .find(id.value())
                    .select(pizzas::id)
                    .first::<i64>(tx)
                    .optional()?;
                if existing.is_none() {
                    return Ok(None);
                }

                let removed = diesel::delete(
                    restaurant_pizzas::table.filter(restaurant_pizzas::pizza_id.eq(id.value())),
                )
                .execute(tx)?;
                diesel::delete(pizzas::table.find(id.value())).execute(tx)?;
                Ok(Some(removed))
            })
        })
        .await
    }
}

#[async_trait]
impl RestaurantPizzaRepository for PostgresRepository {
    async fn insert_restaurant_pizza(
        &self,
        restaurant_pizza: &NewRestaurantPizza,
    ) -> RepositoryResult<RestaurantPizza> {
        const OPERATION: &str = "insert_restaurant_pizza";
        let row = NewRestaurantPizzaRow {
            price: restaurant_pizza.price.value(),
            restaurant_id: restaurant_pizza.restaurant_id.value(),
            pizza_id: restaurant_pizza.pizza_id.value(),
        };
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let restaurant = restaurants::table
                    .find(row.restaurant_id)
                    .select(restaurants::id)
                    .first::<i64>(tx)
                    .optional()?;
                if restaurant.is_none() {
                    return Err(RepositoryError::missing_entity(
                        OPERATION,
                        "Restaurant",
                        row.restaurant_id,
                    ));
                }
                let pizza = pizzas::table
                    .find(row.pizza_id)
                    .select(pizzas::id)
                    .first::<i64>(tx)
                    .optional()?;
                if pizza.is_none() {
                    return Err(RepositoryError::missing_entity(OPERATION, "Pizza", row.pizza_id));
                }

                let inserted = diesel::insert_into(restaurant_pizzas::table)
                    .values(&row)
                    .returning(RestaurantPizzaRow::as_returning())
                    .get_result::<RestaurantPizzaRow>(tx)?;
                RestaurantPizza::try_from(inserted)
            })
        })
        .await
    }

    async fn get_restaurant_pizza(
        &self,
        id: RestaurantPizzaId,
    ) -> RepositoryResult<Option<RestaurantPizza>> {
        self.with_conn(move |conn| {
            let row = restaurant_pizzas::table
                .find(id.value())
                .select(RestaurantPizzaRow::as_select())
                .first::<RestaurantPizzaRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(RestaurantPizza::try_from).transpose()
        })
        .await
    }

    async fn list_restaurant_pizzas(&self) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.with_conn(|conn| {
            let rows = restaurant_pizzas::table
                .order(restaurant_pizzas::id.asc())
                .select(RestaurantPizzaRow::as_select())
                .load::<RestaurantPizzaRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_restaurant_pizzas(rows)
        })
        .await
    }

    async fn list_restaurant_pizzas_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.with_conn(move |conn| {
            let rows = restaurant_pizzas::table
                .filter(restaurant_pizzas::restaurant_id.eq(restaurant_id.value()))
                .order(restaurant_pizzas::id.asc())
                .select(RestaurantPizzaRow::as_select())
                .load::<RestaurantPizzaRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_restaurant_pizzas(rows)
        })
        .await
    }

    async fn list_restaurant_pizzas_for_pizza(
        &self,
        pizza_id: PizzaId,
    ) -> RepositoryResult<Vec<RestaurantPizza>> {
        self.with_conn(move |conn| {
            let rows = restaurant_pizzas::table
                .filter(restaurant_pizzas::pizza_id.eq(pizza_id.value()))
                .order(restaurant_pizzas::id.asc())
                .select(RestaurantPizzaRow::as_select())
                .load::<RestaurantPizzaRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_restaurant_pizzas(rows)
        })
        .await
    }
}
