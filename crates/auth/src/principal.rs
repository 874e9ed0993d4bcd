use serde::{Deserialize, Serialize};

use staffdesk_core::UserId;

use crate::{Claim, ClaimType, RoleName};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub roles: Vec<RoleName>,
    pub claims: Vec<Claim>,
}

impl Principal {
    pub fn new(id: UserId, roles: Vec<RoleName>, claims: Vec<Claim>) -> Self {
        Self { id, roles, claims }
    }

    pub fn is_in_role(&self, role: &RoleName) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True when the principal holds `claim_type` with value `"true"`.
    pub fn has_claim(&self, claim_type: ClaimType) -> bool {
        self.claims.iter().any(|c| c.grants(claim_type))
    }
}
