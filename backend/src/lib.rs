//! # Pizzeria
//!
//! JSON HTTP service over three related tables: restaurants, pizzas, and the
//! priced `restaurant_pizzas` associations between them.
//!
//! ## Architecture
//!
//! - [`models`]: entities, identity newtypes and the validated [`models::Price`]
//! - [`serializer`]: cycle-safe conversion of related entities to JSON, and the
//!   per-endpoint output shapes
//! - [`db`]: repository traits, in-memory and PostgreSQL backends, service layer
//! - [`config`]: server settings from the environment
//! - [`http`]: axum router and handlers (`http-server` feature)

// RepositoryError carries structured context and is larger than clippy likes.
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod serializer;

#[cfg(feature = "http-server")]
pub mod http;
