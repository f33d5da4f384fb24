//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Health check
//!
//! # Auth
//! POST   /auth/register                  - Register and log in
//! POST   /auth/login                     - Log in
//! POST   /auth/logout                    - Log out
//! GET    /account                        - Account overview (requires auth)
//!
//! # Catalog
//! GET    /products                       - Product listing (?search=&category=&sort=)
//! GET    /products/{id}                  - Product detail
//! GET    /categories                     - Categories in the catalog
//!
//! # Cart (requires auth)
//! GET    /cart                           - Cart with totals
//! DELETE /cart                           - Empty the cart
//! POST   /cart/items                     - Add to cart
//! PUT    /cart/items/{product_id}        - Set quantity
//! DELETE /cart/items/{product_id}        - Remove line
//! POST   /checkout                       - Place an order
//!
//! # Orders (requires auth)
//! GET    /orders                         - Order history
//! GET    /orders/{id}                    - Order detail
//! POST   /orders/{id}/reorder            - Copy order into cart
//!
//! # Admin (requires admin)
//! GET    /admin/dashboard                - Dashboard figures
//! POST   /admin/products                 - Add product
//! PATCH  /admin/products/{id}            - Edit product
//! DELETE /admin/products/{id}            - Remove product
//! PUT    /admin/products/{id}/stock      - Set stock
//! GET    /admin/orders                   - All orders
//! POST   /admin/orders/{id}/status       - Change status
//! POST   /admin/orders/{id}/cancel       - Cancel order
//! GET    /admin/users                    - All accounts
//! PUT    /admin/users/{email}/admin      - Grant or revoke admin
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{product_id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/reorder", post(orders::reorder))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            axum::routing::patch(admin::update_product).delete(admin::delete_product),
        )
        .route("/products/{id}/stock", put(admin::set_stock))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", post(admin::set_status))
        .route("/orders/{id}/cancel", post(admin::cancel_order))
        .route("/users", get(admin::users))
        .route("/users/{email}/admin", put(admin::set_admin))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/account", get(auth::account))
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}
