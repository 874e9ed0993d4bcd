use std::collections::BTreeSet;

use async_trait::async_trait;

use staffdesk_auth::Claim;
use staffdesk_core::{DomainResult, RoleId, UserId};

use crate::{Role, User};

/// Role side of the identity directory.
///
/// Failures are reported, never retried: `Validation` for rejected input
/// (duplicate or empty names), `NotFound` for vanished records,
/// `ReferentialConstraint` when a role still has members.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn create(&self, role: Role) -> DomainResult<()>;

    async fn find_by_id(&self, id: &RoleId) -> DomainResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Role>>;

    async fn update(&self, role: Role) -> DomainResult<()>;

    async fn delete(&self, role: &Role) -> DomainResult<()>;

    /// All roles, ordered by name.
    async fn list(&self) -> DomainResult<Vec<Role>>;
}

/// User side of the identity directory, including memberships and claims.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create(&self, user: User) -> DomainResult<()>;

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>>;

    async fn update(&self, user: User) -> DomainResult<()>;

    async fn delete(&self, user: &User) -> DomainResult<()>;

    /// All users, ordered by username.
    async fn list(&self) -> DomainResult<Vec<User>>;

    async fn is_in_role(&self, user: &User, role_name: &str) -> DomainResult<bool>;

    async fn roles_of(&self, user: &User) -> DomainResult<BTreeSet<String>>;

    async fn claims_of(&self, user: &User) -> DomainResult<Vec<Claim>>;

    /// All-or-nothing: either every role is added or none is.
    async fn add_to_roles(&self, user: &User, role_names: &[String]) -> DomainResult<()>;

    /// All-or-nothing: either every role is removed or none is.
    async fn remove_from_roles(&self, user: &User, role_names: &[String]) -> DomainResult<()>;

    async fn add_claims(&self, user: &User, claims: &[Claim]) -> DomainResult<()>;

    async fn remove_claims(&self, user: &User, claims: &[Claim]) -> DomainResult<()>;
}
