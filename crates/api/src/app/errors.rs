use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use staffdesk_admin::{AdminError, Redirect};
use staffdesk_employees::EmployeeError;

pub const ACCESS_DENIED_PATH: &str = "/admin/access-denied";

const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

pub fn admin_error_to_response(err: AdminError) -> axum::response::Response {
    match err {
        AdminError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        AdminError::Validation(errors) => validation_error(errors),
        AdminError::ReferentialConstraint { title, message } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "referential_constraint",
                "title": title,
                "message": message,
            })),
        )
            .into_response(),
        AdminError::Unauthorized(e) => access_denied(e.to_string()),
        AdminError::Unexpected(msg) => unexpected(msg),
    }
}

pub fn employee_error_to_response(err: EmployeeError) -> axum::response::Response {
    match err {
        EmployeeError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", "Employee cannot be found"),
        EmployeeError::Validation(errors) => validation_error(errors),
        EmployeeError::Asset(e) => unexpected(e.to_string()),
        EmployeeError::Unexpected(msg) => unexpected(msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn validation_error(errors: Vec<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": errors.join(" "),
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn access_denied(detail: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "access_denied",
            "message": detail.into(),
            "location": ACCESS_DENIED_PATH,
        })),
    )
        .into_response()
}

/// Details go to the log only.
fn unexpected(detail: String) -> axum::response::Response {
    tracing::error!(error = %detail, "request failed unexpectedly");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", UNEXPECTED_MESSAGE)
}

/// 303 with a `Location` header; the body repeats the target for JSON clients.
pub fn see_other(location: String) -> axum::response::Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.clone())],
        axum::Json(json!({ "redirect": location })),
    )
        .into_response()
}

pub fn redirect(to: Redirect) -> axum::response::Response {
    see_other(to.location())
}
