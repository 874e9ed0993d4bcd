//! User workflows, including bulk role and claim assignment.

use std::collections::BTreeSet;

use tracing::{error, info, warn};

use staffdesk_auth::{Claim, ClaimType, Policy, PolicyContext, Principal, authorize};
use staffdesk_core::UserId;
use staffdesk_directory::User;

use crate::forms::{
    ClaimSelection, EditUserView, ManageUserClaimsView, ManageUserRolesView, RoleChoice, RoleSelection, UserForm,
};
use crate::membership::reconcile;
use crate::{AdminError, AdminResult, Administration, Redirect};

impl Administration {
    pub async fn list_users(&self) -> AdminResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    pub async fn edit_user_form(&self, raw_id: &str) -> AdminResult<EditUserView> {
        let user = self.find_user(raw_id).await?;
        let claims = self.users.claims_of(&user).await?.iter().map(Claim::to_string).collect();
        let roles = self.users.roles_of(&user).await?.into_iter().collect();

        Ok(EditUserView {
            id: user.id,
            email: user.email,
            username: user.username,
            city: user.city,
            claims,
            roles,
        })
    }

    pub async fn edit_user(&self, principal: &Principal, raw_id: &str, form: UserForm) -> AdminResult<Redirect> {
        let mut user = self.find_user(raw_id).await?;
        form.validate()?;

        user.email = form.email.trim().to_string();
        user.username = form.username.trim().to_string();
        user.city = form.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let id = user.id;
        self.users.update(user).await?;

        info!(user_id = %id, actor = %principal.id, "user updated");
        Ok(Redirect::UserList)
    }

    pub async fn delete_user(&self, principal: &Principal, raw_id: &str) -> AdminResult<Redirect> {
        let user = self.find_user(raw_id).await?;
        self.users.delete(&user).await?;

        info!(user_id = %user.id, actor = %principal.id, "user deleted");
        Ok(Redirect::UserList)
    }

    pub async fn manage_user_roles_form(&self, principal: &Principal, raw_id: &str) -> AdminResult<ManageUserRolesView> {
        let user = self.authorized_target(principal, raw_id).await?;
        let held = self.users.roles_of(&user).await?;

        let roles = self
            .roles
            .list()
            .await?
            .into_iter()
            .map(|role| RoleSelection {
                is_selected: held.contains(&role.name),
                role_id: role.id,
                role_name: role.name,
            })
            .collect();

        Ok(ManageUserRolesView { user_id: user.id, roles })
    }

    /// Replace the user's roles with the selected ones.
    ///
    /// Roles held and still selected are left alone. Removal runs before
    /// addition; if addition fails the removed roles are restored.
    pub async fn manage_user_roles(
        &self,
        principal: &Principal,
        raw_id: &str,
        choices: &[RoleChoice],
    ) -> AdminResult<Redirect> {
        let user = self.authorized_target(principal, raw_id).await?;

        let mut desired = BTreeSet::new();
        let mut unknown = Vec::new();
        for choice in choices.iter().filter(|c| c.is_selected) {
            match self.roles.find_by_id(&choice.role_id).await? {
                Some(role) => {
                    desired.insert(role.name);
                }
                None => unknown.push(format!("Role with Id = {} cannot be found", choice.role_id)),
            }
        }
        if !unknown.is_empty() {
            return Err(AdminError::Validation(unknown));
        }

        let held = self.users.roles_of(&user).await?;
        let plan = reconcile(&held, &desired);

        if !plan.to_remove.is_empty() {
            self.users
                .remove_from_roles(&user, &plan.to_remove)
                .await
                .map_err(|err| AdminError::step_failed("Cannot remove user existing roles", err))?;
        }
        if !plan.to_add.is_empty() {
            if let Err(err) = self.users.add_to_roles(&user, &plan.to_add).await {
                warn!(user_id = %user.id, error = %err, "role assignment failed; restoring previous roles");
                if !plan.to_remove.is_empty() {
                    if let Err(restore) = self.users.add_to_roles(&user, &plan.to_remove).await {
                        error!(user_id = %user.id, error = %restore, "role restore failed");
                    }
                }
                return Err(AdminError::step_failed("Cannot add selected roles to user", err));
            }
        }

        info!(
            user_id = %user.id,
            added = plan.to_add.len(),
            removed = plan.to_remove.len(),
            actor = %principal.id,
            "user roles updated"
        );
        Ok(Redirect::EditUser(user.id))
    }

    pub async fn manage_user_claims_form(
        &self,
        principal: &Principal,
        raw_id: &str,
    ) -> AdminResult<ManageUserClaimsView> {
        let user = self.authorized_target(principal, raw_id).await?;
        let held = self.users.claims_of(&user).await?;

        let claims = ClaimType::ALL
            .into_iter()
            .map(|claim_type| ClaimSelection {
                claim_type,
                is_selected: held.iter().any(|c| c.grants(claim_type)),
            })
            .collect();

        Ok(ManageUserClaimsView { user_id: user.id, claims })
    }

    /// Store one claim per catalog type, `true` when selected.
    ///
    /// Same remove-then-add shape as [`Self::manage_user_roles`].
    pub async fn manage_user_claims(
        &self,
        principal: &Principal,
        raw_id: &str,
        selections: &[ClaimSelection],
    ) -> AdminResult<Redirect> {
        let user = self.authorized_target(principal, raw_id).await?;

        let desired: BTreeSet<Claim> = ClaimType::ALL
            .into_iter()
            .map(|t| Claim::new(t, selections.iter().any(|s| s.claim_type == t && s.is_selected)))
            .collect();
        let held: BTreeSet<Claim> = self.users.claims_of(&user).await?.into_iter().collect();
        let plan = reconcile(&held, &desired);

        if !plan.to_remove.is_empty() {
            self.users
                .remove_claims(&user, &plan.to_remove)
                .await
                .map_err(|err| AdminError::step_failed("Cannot remove user existing claims", err))?;
        }
        if !plan.to_add.is_empty() {
            if let Err(err) = self.users.add_claims(&user, &plan.to_add).await {
                warn!(user_id = %user.id, error = %err, "claim assignment failed; restoring previous claims");
                if !plan.to_remove.is_empty() {
                    if let Err(restore) = self.users.add_claims(&user, &plan.to_remove).await {
                        error!(user_id = %user.id, error = %restore, "claim restore failed");
                    }
                }
                return Err(AdminError::step_failed("Cannot add selected claims to user", err));
            }
        }

        info!(user_id = %user.id, changed = plan.to_add.len(), actor = %principal.id, "user claims updated");
        Ok(Redirect::EditUser(user.id))
    }

    async fn find_user(&self, raw_id: &str) -> AdminResult<User> {
        let id: UserId = raw_id.parse().map_err(|_| AdminError::user_not_found(raw_id))?;
        self.users.find_by_id(&id).await?.ok_or_else(|| AdminError::user_not_found(raw_id))
    }

    /// An id that cannot parse names nobody, so it is NotFound before the
    /// policy runs. A parsed id feeds the self-edit guard.
    async fn authorized_target(&self, principal: &Principal, raw_id: &str) -> AdminResult<User> {
        let id: UserId = raw_id.parse().map_err(|_| AdminError::user_not_found(raw_id))?;
        authorize(Policy::ManageUserRole, principal, &PolicyContext::targeting(id))?;
        self.users.find_by_id(&id).await?.ok_or_else(|| AdminError::user_not_found(raw_id))
    }
}
