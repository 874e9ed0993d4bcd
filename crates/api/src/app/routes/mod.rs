use axum::{Router, routing::get};

pub mod employees;
pub mod roles;
pub mod system;
pub mod users;

/// Router for endpoints that need no token.
pub fn public_router() -> Router {
    Router::new()
        .route("/admin/access-denied", get(system::access_denied))
        .merge(employees::public_router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/whoami/policies", get(system::policies))
        .nest("/admin/roles", roles::router())
        .nest("/admin/users", users::router())
        .merge(employees::router())
}
