use staffdesk_auth::Principal;
use staffdesk_core::UserId;

/// Principal context for a request (authenticated identity, roles, claims).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> UserId {
        self.principal.id
    }
}
