use serde::{Deserialize, Serialize};

use staffdesk_auth::{Claim, PolicyExplanation};
use staffdesk_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PolicyQuery {
    /// User the policies should be evaluated against (self-edit guard).
    pub target: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub principal_id: UserId,
    pub roles: Vec<String>,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize)]
pub struct PoliciesResponse {
    pub principal_id: UserId,
    pub policies: Vec<PolicyExplanation>,
}

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
}

impl From<staffdesk_directory::Role> for RoleSummary {
    fn from(role: staffdesk_directory::Role) -> Self {
        Self { id: role.id.to_string(), name: role.name }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<staffdesk_directory::User> for UserSummary {
    fn from(user: staffdesk_directory::User) -> Self {
        Self { id: user.id.to_string(), username: user.username, email: user.email }
    }
}
