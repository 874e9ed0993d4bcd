//! In-memory identity directory for tests/dev.
//!
//! Roles, users, memberships and claims live behind a single lock so that
//! cross-cutting checks (unique names, "role still has members") are
//! evaluated against one consistent snapshot. No guard is held across an
//! `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use staffdesk_auth::Claim;
use staffdesk_core::{DomainError, DomainResult, RoleId, UserId};

use crate::{Role, RoleDirectory, Table, User, UserDirectory};

#[derive(Debug, Default)]
struct IdentityState {
    roles: Table<Role>,
    users: Table<User>,
    memberships: HashMap<UserId, BTreeSet<RoleId>>,
    claims: HashMap<UserId, Vec<Claim>>,
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

impl IdentityState {
    fn role_by_name(&self, name: &str) -> Option<&Role> {
        let wanted = normalize(name);
        self.roles.find(|r| normalize(&r.name) == wanted)
    }

    fn require_user(&self, id: &UserId) -> DomainResult<&User> {
        self.users.get(id).ok_or(DomainError::NotFound)
    }

    fn member_count(&self, role_id: &RoleId) -> usize {
        self.memberships.values().filter(|set| set.contains(role_id)).count()
    }

    fn validate_role(&self, role: &Role) -> DomainResult<()> {
        if role.name.trim().is_empty() {
            return Err(DomainError::validation(format!("Role name '{}' is invalid.", role.name)));
        }
        match self.role_by_name(&role.name) {
            Some(existing) if existing.id != role.id => Err(DomainError::validation(format!(
                "Role name '{}' is already taken.",
                role.name
            ))),
            _ => Ok(()),
        }
    }

    fn validate_user(&self, user: &User) -> DomainResult<()> {
        let mut errors = Vec::new();
        if user.username.trim().is_empty() {
            errors.push(format!("Username '{}' is invalid.", user.username));
        } else {
            let wanted = normalize(&user.username);
            if self
                .users
                .find(|u| u.id != user.id && normalize(&u.username) == wanted)
                .is_some()
            {
                errors.push(format!("Username '{}' is already taken.", user.username));
            }
        }
        if !looks_like_email(&user.email) {
            errors.push(format!("Email '{}' is invalid.", user.email));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    /// Resolve role names to ids, rejecting unknown names.
    fn resolve_roles(&self, role_names: &[String]) -> DomainResult<Vec<(RoleId, String)>> {
        let mut resolved = Vec::with_capacity(role_names.len());
        let mut errors = Vec::new();
        for name in role_names {
            match self.role_by_name(name) {
                Some(role) => resolved.push((role.id, role.name.clone())),
                None => errors.push(format!("Role {name} does not exist.")),
            }
        }
        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// In-memory implementation of both directory traits.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<IdentityState>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, IdentityState>> {
        self.state
            .read()
            .map_err(|_| DomainError::unexpected("identity store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, IdentityState>> {
        self.state
            .write()
            .map_err(|_| DomainError::unexpected("identity store lock poisoned"))
    }
}

#[async_trait]
impl RoleDirectory for InMemoryIdentityStore {
    async fn create(&self, role: Role) -> DomainResult<()> {
        let mut state = self.write()?;
        state.validate_role(&role)?;
        if state.roles.contains(&role.id) {
            return Err(DomainError::validation(format!("Role id '{}' already exists.", role.id)));
        }
        tracing::debug!(role_id = %role.id, name = %role.name, "role created");
        state.roles.upsert(role);
        Ok(())
    }

    async fn find_by_id(&self, id: &RoleId) -> DomainResult<Option<Role>> {
        Ok(self.read()?.roles.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        Ok(self.read()?.role_by_name(name).cloned())
    }

    async fn update(&self, role: Role) -> DomainResult<()> {
        let mut state = self.write()?;
        if !state.roles.contains(&role.id) {
            return Err(DomainError::NotFound);
        }
        state.validate_role(&role)?;
        state.roles.upsert(role);
        Ok(())
    }

    async fn delete(&self, role: &Role) -> DomainResult<()> {
        let mut state = self.write()?;
        if !state.roles.contains(&role.id) {
            return Err(DomainError::NotFound);
        }
        let members = state.member_count(&role.id);
        if members > 0 {
            return Err(DomainError::referential(format!(
                "role '{}' is referenced by {members} user membership(s)",
                role.name
            )));
        }
        state.roles.remove(&role.id);
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<Role>> {
        let state = self.read()?;
        let mut roles: Vec<Role> = state.roles.iter().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

#[async_trait]
impl UserDirectory for InMemoryIdentityStore {
    async fn create(&self, user: User) -> DomainResult<()> {
        let mut state = self.write()?;
        if state.users.contains(&user.id) {
            return Err(DomainError::validation(format!("User id '{}' already exists.", user.id)));
        }
        state.validate_user(&user)?;
        state.users.upsert(user);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn update(&self, user: User) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(&user.id)?;
        state.validate_user(&user)?;
        state.users.upsert(user);
        Ok(())
    }

    async fn delete(&self, user: &User) -> DomainResult<()> {
        let mut state = self.write()?;
        if state.users.remove(&user.id).is_none() {
            return Err(DomainError::NotFound);
        }
        state.memberships.remove(&user.id);
        state.claims.remove(&user.id);
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let state = self.read()?;
        let mut users: Vec<User> = state.users.iter().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn is_in_role(&self, user: &User, role_name: &str) -> DomainResult<bool> {
        let state = self.read()?;
        state.require_user(&user.id)?;
        let Some(role) = state.role_by_name(role_name) else {
            return Ok(false);
        };
        Ok(state
            .memberships
            .get(&user.id)
            .is_some_and(|set| set.contains(&role.id)))
    }

    async fn roles_of(&self, user: &User) -> DomainResult<BTreeSet<String>> {
        let state = self.read()?;
        state.require_user(&user.id)?;
        Ok(state
            .memberships
            .get(&user.id)
            .map(|set| {
                set.iter()
                    .filter_map(|id| state.roles.get(id).map(|r| r.name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn claims_of(&self, user: &User) -> DomainResult<Vec<Claim>> {
        let state = self.read()?;
        state.require_user(&user.id)?;
        Ok(state.claims.get(&user.id).cloned().unwrap_or_default())
    }

    async fn add_to_roles(&self, user: &User, role_names: &[String]) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(&user.id)?;
        let resolved = state.resolve_roles(role_names)?;

        let current = state.memberships.get(&user.id).cloned().unwrap_or_default();
        let mut seen = BTreeSet::new();
        let mut errors = Vec::new();
        for (id, name) in &resolved {
            if current.contains(id) || !seen.insert(*id) {
                errors.push(format!("User already in role '{name}'."));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        state.memberships.entry(user.id).or_default().extend(seen);
        Ok(())
    }

    async fn remove_from_roles(&self, user: &User, role_names: &[String]) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(&user.id)?;
        let resolved = state.resolve_roles(role_names)?;

        let current = state.memberships.get(&user.id).cloned().unwrap_or_default();
        let errors: Vec<String> = resolved
            .iter()
            .filter(|(id, _)| !current.contains(id))
            .map(|(_, name)| format!("User is not in role '{name}'."))
            .collect();
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        if let Some(set) = state.memberships.get_mut(&user.id) {
            for (id, _) in &resolved {
                set.remove(id);
            }
        }
        Ok(())
    }

    async fn add_claims(&self, user: &User, claims: &[Claim]) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(&user.id)?;

        let current = state.claims.get(&user.id).cloned().unwrap_or_default();
        let mut seen = BTreeSet::new();
        let mut errors = Vec::new();
        for claim in claims {
            let held = current.iter().any(|c| c.claim_type == claim.claim_type);
            if held || !seen.insert(claim.claim_type) {
                errors.push(format!("User already has claim '{}'.", claim.claim_type));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        state.claims.entry(user.id).or_default().extend_from_slice(claims);
        Ok(())
    }

    async fn remove_claims(&self, user: &User, claims: &[Claim]) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(&user.id)?;
        if let Some(held) = state.claims.get_mut(&user.id) {
            held.retain(|c| !claims.contains(c));
        }
        Ok(())
    }
}
