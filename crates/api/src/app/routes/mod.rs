use axum::Router;

pub mod categories;
pub mod products;
pub mod suppliers;
pub mod system;

/// Router for the `/api` tree.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/suppliers", suppliers::router())
}
