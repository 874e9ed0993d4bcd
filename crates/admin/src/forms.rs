//! Form inputs and view snapshots exchanged with the presentation layer.

use serde::{Deserialize, Serialize};

use staffdesk_auth::ClaimType;
use staffdesk_core::{RoleId, UserId};

use crate::AdminError;

fn required(value: &str, field: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("The {field} field is required."));
    }
}

fn finish(errors: Vec<String>) -> Result<(), AdminError> {
    if errors.is_empty() { Ok(()) } else { Err(AdminError::Validation(errors)) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub role_name: String,
}

impl RoleForm {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self { role_name: role_name.into() }
    }

    pub fn validate(&self) -> Result<(), AdminError> {
        let mut errors = Vec::new();
        required(&self.role_name, "Role Name", &mut errors);
        finish(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditRoleView {
    pub id: RoleId,
    pub role_name: String,
    /// Usernames of current members.
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRoleSelection {
    pub user_id: UserId,
    pub username: String,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersInRoleView {
    pub role_id: RoleId,
    pub role_name: String,
    pub users: Vec<UserRoleSelection>,
}

/// One checkbox of the users-in-role form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChoice {
    pub user_id: UserId,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub city: Option<String>,
}

impl UserForm {
    pub fn validate(&self) -> Result<(), AdminError> {
        let mut errors = Vec::new();
        required(&self.email, "Email", &mut errors);
        required(&self.username, "User Name", &mut errors);
        finish(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditUserView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub city: Option<String>,
    /// `"<type>: <value>"` lines.
    pub claims: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSelection {
    pub role_id: RoleId,
    pub role_name: String,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManageUserRolesView {
    pub user_id: UserId,
    pub roles: Vec<RoleSelection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChoice {
    pub role_id: RoleId,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSelection {
    pub claim_type: ClaimType,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManageUserClaimsView {
    pub user_id: UserId,
    pub claims: Vec<ClaimSelection>,
}
