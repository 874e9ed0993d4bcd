//! Employee routes. Reads are public; writes need a token.
//!
//! Employees are addressed by opaque tokens, never by their numeric id.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Multipart, Path},
    response::IntoResponse,
    routing::{get, post},
};

use staffdesk_employees::{Department, EmployeeInput, PhotoUpload};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees/:token", get(employee_details))
}

pub fn router() -> Router {
    Router::new()
        .route("/employees", post(create_employee))
        .route("/employees/:token", post(update_employee))
        .route("/employees/:token/edit", get(edit_employee_form))
        .route("/employees/:token/delete", post(delete_employee))
}

/// GET /employees
pub async fn list_employees(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.employees.list().await {
        Ok(employees) => Json(employees).into_response(),
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// GET /employees/:token
pub async fn employee_details(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    match services.employees.details(&token).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// POST /employees (multipart: name, email, department, photo)
pub async fn create_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    multipart: Multipart,
) -> axum::response::Response {
    let (input, photo) = match read_employee_form(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    match services.employees.create(input, photo).await {
        Ok(view) => {
            tracing::info!(actor = %principal.principal_id(), "employee created via api");
            errors::see_other(format!("/employees/{}", view.id))
        }
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// GET /employees/:token/edit
pub async fn edit_employee_form(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    match services.employees.edit_form(&token).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// POST /employees/:token (multipart)
pub async fn update_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
    multipart: Multipart,
) -> axum::response::Response {
    let (input, photo) = match read_employee_form(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    match services.employees.update(&token, input, photo).await {
        Ok(_) => errors::see_other("/employees".to_string()),
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// POST /employees/:token/delete
pub async fn delete_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    match services.employees.delete(&token).await {
        Ok(()) => errors::see_other("/employees".to_string()),
        Err(e) => errors::employee_error_to_response(e),
    }
}

/// An empty file part (no name or no bytes) means "no new photo".
async fn read_employee_form(
    mut multipart: Multipart,
) -> Result<(EmployeeInput, Option<PhotoUpload>), axum::response::Response> {
    let mut input = EmployeeInput::default();
    let mut photo = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(errors::validation_error(vec![e.body_text()])),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| errors::validation_error(vec![e.body_text()]))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    photo = Some(PhotoUpload::new(file_name, bytes.to_vec()));
                }
            }
            "name" | "email" | "department" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| errors::validation_error(vec![e.body_text()]))?;
                match name.as_str() {
                    "name" => input.name = text,
                    "email" => input.email = text,
                    _ if text.trim().is_empty() => input.department = None,
                    _ => match text.parse::<Department>() {
                        Ok(d) => input.department = Some(d),
                        Err(e) => return Err(errors::employee_error_to_response(e)),
                    },
                }
            }
            _ => {}
        }
    }

    Ok((input, photo))
}
