// storefront/src/services/mod.rs

//! Service objects sitting between the HTTP handlers and the repository.

pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod session_store;

pub use auth_service::{AuthService, Registration};
pub use cart_service::{CartService, OrderSummary};
pub use catalog_service::CatalogService;
pub use session_store::{Flash, FlashCategory, SessionInfo, SessionStore};
