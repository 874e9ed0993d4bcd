use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use staffdesk_auth::{Policy, PolicyContext, explain};
use staffdesk_core::UserId;

use crate::app::dto::{PoliciesResponse, PolicyQuery, WhoAmIResponse};
use crate::app::errors;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn access_denied() -> impl IntoResponse {
    Json(json!({
        "error": "access_denied",
        "message": "You do not have access to this resource",
    }))
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    let p = principal.principal();
    Json(WhoAmIResponse {
        principal_id: p.id,
        roles: p.roles.iter().map(|r| r.as_str().to_string()).collect(),
        claims: p.claims.clone(),
    })
}

/// GET /whoami/policies?target=<user id> - explain every policy for the caller
pub async fn policies(
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<PolicyQuery>,
) -> axum::response::Response {
    let ctx = match query.target.as_deref() {
        None => PolicyContext::none(),
        Some(raw) => match raw.parse::<UserId>() {
            Ok(id) => PolicyContext::targeting(id),
            Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_target", e.to_string()),
        },
    };

    let policies = Policy::ALL
        .iter()
        .map(|policy| explain(*policy, principal.principal(), &ctx))
        .collect();

    Json(PoliciesResponse { principal_id: principal.principal_id(), policies }).into_response()
}
