//! Role administration routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
};

use staffdesk_admin::forms::{RoleForm, UserChoice};

use crate::app::dto::RoleSummary;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/new", get(create_role_form))
        .route("/:id", post(edit_role))
        .route("/:id/edit", get(edit_role_form))
        .route("/:id/delete", post(delete_role))
        .route("/:id/users", get(users_in_role_form).post(update_users_in_role))
}

/// GET /admin/roles
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.admin.list_roles().await {
        Ok(roles) => Json(roles.into_iter().map(RoleSummary::from).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/roles/new
pub async fn create_role_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.admin.create_role_form(principal.principal()) {
        Ok(form) => Json(form).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/roles
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RoleForm>,
) -> axum::response::Response {
    match services.admin.create_role(principal.principal(), body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/roles/:id/edit
pub async fn edit_role_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.edit_role_form(principal.principal(), &id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/roles/:id
pub async fn edit_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RoleForm>,
) -> axum::response::Response {
    match services.admin.edit_role(principal.principal(), &id, body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/roles/:id/delete
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.delete_role(principal.principal(), &id).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// GET /admin/roles/:id/users
pub async fn users_in_role_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.admin.users_in_role_form(principal.principal(), &id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /admin/roles/:id/users
pub async fn update_users_in_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<Vec<UserChoice>>,
) -> axum::response::Response {
    match services.admin.update_users_in_role(principal.principal(), &id, &body).await {
        Ok(to) => errors::redirect(to),
        Err(e) => errors::admin_error_to_response(e),
    }
}
