// storefront/src/lib.rs

//! Storefront: a small e-commerce backend. Users register and log in, browse
//! the catalog, collect products in a cart and check out.
//!
//! Pages are served as JSON view models by an actix-web router (`web`);
//! business rules live in the service objects (`services`), which run the
//! Orka workflows in `pipelines` and reach the database only through the
//! `db::Repository` trait.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
