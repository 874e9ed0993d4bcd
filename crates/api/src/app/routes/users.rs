//! User administration routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
};

use staffdesk_admin::forms::{ClaimSelection, RoleChoice, UserForm};

use crate::app::dto::UserSummary;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", post(edit_user))
        .route("/:id/edit", get(edit_user_form))
        .route("/:id/delete", post(delete_user))
        .route("/:id/roles", get(manage_roles_form).post(manage_roles))
        .route("/:id/claims", get(manage_claims_form).post(manage_claims))
}

/// GET /admin/users
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.admin.list_users().await {
        Ok(users) => Json(users.into_iter().map(UserSummary::from).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/users/:id/edit
pub async fn edit_user_form(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.edit_user_form(&id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/users/:id
pub async fn edit_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UserForm>,
) -> axum::response::Response {
    match services.admin.edit_user(principal.principal(), &id, body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/users/:id/delete
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.delete_user(principal.principal(), &id).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/users/:id/roles
pub async fn manage_roles_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.manage_user_roles_form(principal.principal(), &id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/users/:id/roles - body is the full desired role set
pub async fn manage_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<Vec<RoleChoice>>,
) -> axum::response::Response {
    match services.admin.manage_user_roles(principal.principal(), &id, &body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/users/:id/claims
pub async fn manage_claims_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.manage_user_claims_form(principal.principal(), &id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/users/:id/claims
pub async fn manage_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<Vec<ClaimSelection>>,
) -> axum::response::Response {
    match services.admin.manage_user_claims(principal.principal(), &id, &body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}
