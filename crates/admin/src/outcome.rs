use serde::Serialize;

use staffdesk_core::{RoleId, UserId};

/// Where a successful submit sends the caller next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "to", content = "id", rename_all = "snake_case")]
pub enum Redirect {
    RoleList,
    UserList,
    EditRole(RoleId),
    EditUser(UserId),
}

impl Redirect {
    pub fn location(&self) -> String {
        match self {
            Redirect::RoleList => "/admin/roles".to_string(),
            Redirect::UserList => "/admin/users".to_string(),
            Redirect::EditRole(id) => format!("/admin/roles/{id}/edit"),
            Redirect::EditUser(id) => format!("/admin/users/{id}/edit"),
        }
    }
}
