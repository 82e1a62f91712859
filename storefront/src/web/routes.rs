// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers};

/// Registers every page route. Called from `main.rs` and from the
/// integration tests.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(product_handlers::index_handler))
    .route("/health", web::get().to(product_handlers::health_check_handler))
    // Authentication
    .service(
      web::resource("/register")
        .route(web::get().to(auth_handlers::register_form_handler))
        .route(web::post().to(auth_handlers::register_handler)),
    )
    .service(
      web::resource("/login")
        .route(web::get().to(auth_handlers::login_form_handler))
        .route(web::post().to(auth_handlers::login_handler)),
    )
    .route("/logout", web::get().to(auth_handlers::logout_handler))
    // Catalog
    .route("/product/{product_id}", web::get().to(product_handlers::get_product_handler))
    // Cart and checkout; `CurrentUser` sends anonymous visitors to /login.
    .route("/add_to_cart/{product_id}", web::get().to(cart_handlers::add_to_cart_handler))
    .route("/cart", web::get().to(cart_handlers::view_cart_handler))
    .route("/checkout", web::get().to(cart_handlers::checkout_handler))
    .route("/orders", web::get().to(cart_handlers::order_history_handler));
}
