//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the restaurant, dish, and identity ports
//! backed by PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Validation and error semantics live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped to each
//!   port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use restaurants::outbound::persistence::{DbPool, DieselRestaurantRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/restaurants")).await?;
//! let repo = DieselRestaurantRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_dish_repository;
mod diesel_identity_store;
mod diesel_restaurant_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_dish_repository::DieselDishRepository;
pub use diesel_identity_store::DieselIdentityStore;
pub use diesel_restaurant_repository::DieselRestaurantRepository;
pub use migrations::{MigrationError, run_migrations, run_migrations_async};
pub use pool::{DbPool, PoolConfig, PoolError};
