// storefront/src/models/mod.rs

//! Data structures representing database entities and the read models built from them.

pub mod cart_line;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_line::CartLine;
pub use order::{Order, OrderStatus};
pub use order_item::OrderItem;
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
