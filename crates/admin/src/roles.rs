//! Role workflows.

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use staffdesk_auth::{Policy, PolicyContext, Principal, authorize};
use staffdesk_core::{DomainError, RoleId};
use staffdesk_directory::{Role, User};

use crate::forms::{EditRoleView, RoleForm, UserChoice, UserRoleSelection, UsersInRoleView};
use crate::{AdminError, AdminResult, Administration, Redirect};

impl Administration {
    pub async fn list_roles(&self) -> AdminResult<Vec<Role>> {
        Ok(self.roles.list().await?)
    }

    pub fn create_role_form(&self, principal: &Principal) -> AdminResult<RoleForm> {
        authorize(Policy::CreateRole, principal, &PolicyContext::none())?;
        Ok(RoleForm::default())
    }

    pub async fn create_role(&self, principal: &Principal, form: RoleForm) -> AdminResult<Redirect> {
        authorize(Policy::CreateRole, principal, &PolicyContext::none())?;
        form.validate()?;

        let role = Role::new(form.role_name.trim());
        let (role_id, role_name) = (role.id, role.name.clone());
        self.roles.create(role).await?;

        info!(%role_id, %role_name, actor = %principal.id, "role created");
        Ok(Redirect::RoleList)
    }

    pub async fn edit_role_form(&self, principal: &Principal, role_id: &str) -> AdminResult<EditRoleView> {
        authorize(Policy::EditRole, principal, &PolicyContext::none())?;
        let role = self.find_role(role_id).await?;
        let users = self.members_of(&role).await?.into_iter().map(|u| u.username).collect();

        Ok(EditRoleView { id: role.id, role_name: role.name, users })
    }

    /// Renames a role. Memberships follow the role id, so they survive.
    pub async fn edit_role(&self, principal: &Principal, role_id: &str, form: RoleForm) -> AdminResult<Redirect> {
        authorize(Policy::EditRole, principal, &PolicyContext::none())?;
        let mut role = self.find_role(role_id).await?;
        form.validate()?;

        role.name = form.role_name.trim().to_string();
        let id = role.id;
        self.roles.update(role).await?;

        info!(role_id = %id, actor = %principal.id, "role renamed");
        Ok(Redirect::RoleList)
    }

    pub async fn delete_role(&self, principal: &Principal, role_id: &str) -> AdminResult<Redirect> {
        authorize(Policy::DeleteRole, principal, &PolicyContext::none())?;
        let role = self.find_role(role_id).await?;

        match self.roles.delete(&role).await {
            Ok(()) => {
                info!(role_id = %role.id, role_name = %role.name, actor = %principal.id, "role deleted");
                Ok(Redirect::RoleList)
            }
            Err(DomainError::ReferentialConstraint(detail)) => {
                warn!(role_id = %role.id, %detail, "role delete blocked");
                Err(AdminError::ReferentialConstraint {
                    title: format!("{} role is in use", role.name),
                    message: format!(
                        "{} role cannot be deleted as there are users in this role. If you want to delete this role, please remove the users from the role and then try to delete",
                        role.name
                    ),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn users_in_role_form(&self, principal: &Principal, role_id: &str) -> AdminResult<UsersInRoleView> {
        authorize(Policy::EditRole, principal, &PolicyContext::none())?;
        let role = self.find_role(role_id).await?;

        let mut users = Vec::new();
        for user in self.users.list().await? {
            let is_selected = self.users.is_in_role(&user, &role.name).await?;
            users.push(UserRoleSelection { user_id: user.id, username: user.username, is_selected });
        }

        Ok(UsersInRoleView { role_id: role.id, role_name: role.name, users })
    }

    /// Applies every checkbox or none of them.
    ///
    /// Unknown user ids are rejected before anything is touched. If a step
    /// fails midway, the steps already applied are reverted.
    pub async fn update_users_in_role(
        &self,
        principal: &Principal,
        role_id: &str,
        choices: &[UserChoice],
    ) -> AdminResult<Redirect> {
        authorize(Policy::EditRole, principal, &PolicyContext::none())?;
        let role = self.find_role(role_id).await?;

        // Last choice per user wins.
        let wanted: BTreeMap<_, _> = choices.iter().map(|c| (c.user_id, c.is_selected)).collect();

        let mut plan: Vec<(User, bool)> = Vec::new();
        let mut unknown = Vec::new();
        for (user_id, selected) in wanted {
            let Some(user) = self.users.find_by_id(&user_id).await? else {
                unknown.push(format!("User with Id = {user_id} cannot be found"));
                continue;
            };
            let member = self.users.is_in_role(&user, &role.name).await?;
            if selected != member {
                plan.push((user, selected));
            }
        }
        if !unknown.is_empty() {
            return Err(AdminError::Validation(unknown));
        }

        let names = [role.name.clone()];
        for (done, (user, add)) in plan.iter().enumerate() {
            let step = if *add {
                self.users.add_to_roles(user, &names).await
            } else {
                self.users.remove_from_roles(user, &names).await
            };
            if let Err(err) = step {
                warn!(role_id = %role.id, user_id = %user.id, error = %err, "membership step failed; reverting");
                for (user, add) in plan[..done].iter().rev() {
                    let undo = if *add {
                        self.users.remove_from_roles(user, &names).await
                    } else {
                        self.users.add_to_roles(user, &names).await
                    };
                    if let Err(undo_err) = undo {
                        error!(role_id = %role.id, user_id = %user.id, error = %undo_err, "membership revert failed");
                    }
                }
                return Err(AdminError::step_failed("Cannot update users in role", err));
            }
        }

        info!(role_id = %role.id, changed = plan.len(), actor = %principal.id, "role membership updated");
        Ok(Redirect::EditRole(role.id))
    }

    pub(crate) async fn find_role(&self, raw_id: &str) -> AdminResult<Role> {
        let id: RoleId = raw_id.parse().map_err(|_| AdminError::role_not_found(raw_id))?;
        self.roles.find_by_id(&id).await?.ok_or_else(|| AdminError::role_not_found(raw_id))
    }

    async fn members_of(&self, role: &Role) -> AdminResult<Vec<User>> {
        let mut members = Vec::new();
        for user in self.users.list().await? {
            if self.users.is_in_role(&user, &role.name).await? {
                members.push(user);
            }
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use staffdesk_auth::{AuthzError, Claim, ClaimType};
    use staffdesk_directory::{InMemoryIdentityStore, RoleDirectory, UserDirectory};

    use super::*;
    use crate::testing::{FlakyUsers, admin_for, nobody, role_manager, seed_user, super_admin};

    async fn role_named(store: &InMemoryIdentityStore, name: &str) -> Role {
        store.find_by_name(name).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn second_manager_is_a_validation_error_and_first_survives() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        let principal = role_manager();

        let first = admin.create_role(&principal, RoleForm::new("Manager")).await.unwrap();
        assert_eq!(first, Redirect::RoleList);

        let err = admin.create_role(&principal, RoleForm::new("Manager")).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert_eq!(admin.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_the_create_role_claim() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store);
        let principal = Principal::new(
            staffdesk_core::UserId::new(),
            vec![staffdesk_auth::RoleName::ADMIN],
            vec![Claim::new(ClaimType::CreateRole, false)],
        );

        let err = admin.create_role(&principal, RoleForm::new("Manager")).await.unwrap_err();
        assert_eq!(err, AdminError::Unauthorized(AuthzError::Forbidden(Policy::CreateRole)));
        assert!(admin.list_roles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_view_lists_members_by_username() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Staff")).await.unwrap();
        let role = role_named(&store, "Staff").await;
        let alice = seed_user(&store, "alice").await;
        seed_user(&store, "bob").await;
        store.add_to_roles(&alice, &["Staff".to_string()]).await.unwrap();

        let view = admin.edit_role_form(&super_admin(), &role.id.to_string()).await.unwrap();
        assert_eq!(view.role_name, "Staff");
        assert_eq!(view.users, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn rename_keeps_memberships() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Staff")).await.unwrap();
        let role = role_named(&store, "Staff").await;
        let alice = seed_user(&store, "alice").await;
        store.add_to_roles(&alice, &["Staff".to_string()]).await.unwrap();

        admin.edit_role(&role_manager(), &role.id.to_string(), RoleForm::new("Crew")).await.unwrap();

        assert!(store.is_in_role(&alice, "Crew").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_or_garbage_role_id_is_not_found() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store);

        let err = admin.edit_role_form(&super_admin(), "xyz").await.unwrap_err();
        assert_eq!(err, AdminError::NotFound("Role with Id = xyz cannot be found".into()));

        let missing = RoleId::new().to_string();
        let err = admin.delete_role(&super_admin(), &missing).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_role_in_use_explains_why() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Payroll")).await.unwrap();
        let role = role_named(&store, "Payroll").await;
        let alice = seed_user(&store, "alice").await;
        store.add_to_roles(&alice, &["Payroll".to_string()]).await.unwrap();

        let err = admin.delete_role(&role_manager(), &role.id.to_string()).await.unwrap_err();
        let AdminError::ReferentialConstraint { title, message } = err else {
            panic!("expected referential constraint");
        };
        assert_eq!(title, "Payroll role is in use");
        assert!(message.starts_with("Payroll role cannot be deleted as there are users in this role."));
        assert!(store.find_by_name("Payroll").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_an_empty_role_succeeds() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Temp")).await.unwrap();
        let role = role_named(&store, "Temp").await;

        let next = admin.delete_role(&role_manager(), &role.id.to_string()).await.unwrap();
        assert_eq!(next, Redirect::RoleList);
        assert!(admin.list_roles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_in_role_update_adds_and_removes() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Staff")).await.unwrap();
        let role = role_named(&store, "Staff").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        store.add_to_roles(&alice, &["Staff".to_string()]).await.unwrap();

        let choices = [
            UserChoice { user_id: alice.id, is_selected: false },
            UserChoice { user_id: bob.id, is_selected: true },
        ];
        let next = admin.update_users_in_role(&role_manager(), &role.id.to_string(), &choices).await.unwrap();

        assert_eq!(next, Redirect::EditRole(role.id));
        assert!(!store.is_in_role(&alice, "Staff").await.unwrap());
        assert!(store.is_in_role(&bob, "Staff").await.unwrap());

        let view = admin.users_in_role_form(&role_manager(), &role.id.to_string()).await.unwrap();
        let selected: Vec<_> = view.users.iter().filter(|u| u.is_selected).map(|u| u.username.as_str()).collect();
        assert_eq!(selected, vec!["bob"]);
    }

    #[tokio::test]
    async fn users_in_role_rejects_unknown_users_without_mutating() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store.clone());
        admin.create_role(&super_admin(), RoleForm::new("Staff")).await.unwrap();
        let role = role_named(&store, "Staff").await;
        let alice = seed_user(&store, "alice").await;

        let choices = [
            UserChoice { user_id: alice.id, is_selected: true },
            UserChoice { user_id: staffdesk_core::UserId::new(), is_selected: true },
        ];
        let err = admin.update_users_in_role(&super_admin(), &role.id.to_string(), &choices).await.unwrap_err();

        assert!(matches!(err, AdminError::Validation(_)));
        assert!(!store.is_in_role(&alice, "Staff").await.unwrap());
    }

    #[tokio::test]
    async fn users_in_role_failure_midway_reverts_applied_steps() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let flaky = Arc::new(FlakyUsers::new(store.clone()));
        let admin = Administration::new(store.clone(), flaky.clone());
        admin.create_role(&super_admin(), RoleForm::new("Staff")).await.unwrap();
        let role = role_named(&store, "Staff").await;
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;

        // One of the two adds lands, the other is refused.
        flaky.fail_add_after(1);
        let choices = [
            UserChoice { user_id: alice.id, is_selected: true },
            UserChoice { user_id: bob.id, is_selected: true },
        ];
        let err = admin.update_users_in_role(&role_manager(), &role.id.to_string(), &choices).await.unwrap_err();

        let AdminError::Validation(msgs) = err else { panic!("expected validation") };
        assert_eq!(msgs[0], "Cannot update users in role");
        assert!(!store.is_in_role(&alice, "Staff").await.unwrap());
        assert!(!store.is_in_role(&bob, "Staff").await.unwrap());
    }

    #[tokio::test]
    async fn anonymous_principal_cannot_touch_roles() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let admin = admin_for(store);
        assert!(matches!(admin.create_role_form(&nobody()), Err(AdminError::Unauthorized(_))));
        let err = admin.edit_role_form(&nobody(), "xyz").await.unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized(_)));
    }
}
