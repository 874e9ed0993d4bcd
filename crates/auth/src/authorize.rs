use serde::Serialize;
use thiserror::Error;

use staffdesk_core::UserId;

use crate::{ClaimType, Principal, RoleName};

/// Named administrative policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    CreateRole,
    EditRole,
    DeleteRole,
    ManageUserRole,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::CreateRole,
        Policy::EditRole,
        Policy::DeleteRole,
        Policy::ManageUserRole,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::CreateRole => "CreateRolePolicy",
            Policy::EditRole => "EditRolePolicy",
            Policy::DeleteRole => "DeleteRolePolicy",
            Policy::ManageUserRole => "EditUserRolePolicy",
        }
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Request data a policy may consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyContext {
    /// User whose roles/claims are being edited, when the action targets one.
    pub target_user_id: Option<UserId>,
}

impl PolicyContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn targeting(user_id: UserId) -> Self {
        Self {
            target_user_id: Some(user_id),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: policy '{0}' not satisfied")]
    Forbidden(Policy),
}

fn is_editing_admin(principal: &Principal) -> bool {
    principal.is_in_role(&RoleName::ADMIN) && principal.has_claim(ClaimType::EditRole)
}

fn is_super_admin(principal: &Principal) -> bool {
    principal.is_in_role(&RoleName::SUPER_ADMIN)
}

/// Decide whether `principal` may perform the action guarded by `policy`.
///
/// - No IO
/// - No panics
/// - Deterministic in its inputs
pub fn evaluate(policy: Policy, principal: &Principal, ctx: &PolicyContext) -> bool {
    match policy {
        Policy::CreateRole => principal.has_claim(ClaimType::CreateRole),
        Policy::DeleteRole => principal.has_claim(ClaimType::DeleteRole),
        Policy::EditRole => is_editing_admin(principal) || is_super_admin(principal),
        Policy::ManageUserRole => {
            // Without a target the self-edit guard cannot be checked.
            let other_user = ctx.target_user_id.is_some_and(|target| target != principal.id);
            (is_editing_admin(principal) && other_user) || is_super_admin(principal)
        }
    }
}

/// `evaluate`, shaped for `?` at workflow boundaries.
pub fn authorize(policy: Policy, principal: &Principal, ctx: &PolicyContext) -> Result<(), AuthzError> {
    if evaluate(policy, principal, ctx) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(policy))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a policy decision.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyExplanation {
    pub policy: Policy,
    pub granted: bool,
    pub reason: String,
    pub principal: PrincipalState,
    pub denial_reason: Option<DenialReason>,
}

/// Snapshot of what the evaluator looked at.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub principal_id: UserId,
    pub target_user_id: Option<UserId>,
    pub roles: Vec<String>,
    pub claims: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingClaim,
    MissingRole,
    SelfEdit,
    MissingTarget,
}

/// Explain why a policy decision was made (or would be made).
///
/// `granted` always agrees with [`evaluate`].
pub fn explain(policy: Policy, principal: &Principal, ctx: &PolicyContext) -> PolicyExplanation {
    let state = PrincipalState {
        principal_id: principal.id,
        target_user_id: ctx.target_user_id,
        roles: principal.roles.iter().map(|r| r.as_str().to_string()).collect(),
        claims: principal.claims.iter().map(|c| c.to_string()).collect(),
    };

    let decision = match policy {
        Policy::CreateRole => claim_decision(principal, ClaimType::CreateRole),
        Policy::DeleteRole => claim_decision(principal, ClaimType::DeleteRole),
        Policy::EditRole => edit_decision(principal),
        Policy::ManageUserRole => {
            if is_super_admin(principal) || !is_editing_admin(principal) {
                edit_decision(principal)
            } else {
                match ctx.target_user_id {
                    None => Err(DenialReason {
                        kind: DenialKind::MissingTarget,
                        message: "No target user was supplied, so the self-edit guard cannot be checked"
                            .to_string(),
                        suggestions: vec!["Pass the id of the user being edited".to_string()],
                    }),
                    Some(target) if target == principal.id => Err(DenialReason {
                        kind: DenialKind::SelfEdit,
                        message: "Admins cannot edit their own roles or claims".to_string(),
                        suggestions: vec![format!(
                            "Ask another administrator, or a member of '{}'",
                            RoleName::SUPER_ADMIN
                        )],
                    }),
                    Some(_) => Ok(format!(
                        "Member of '{}' with claim '{}' editing another user",
                        RoleName::ADMIN,
                        ClaimType::EditRole
                    )),
                }
            }
        }
    };

    match decision {
        Ok(reason) => PolicyExplanation {
            policy,
            granted: true,
            reason,
            principal: state,
            denial_reason: None,
        },
        Err(denial) => PolicyExplanation {
            policy,
            granted: false,
            reason: denial.message.clone(),
            principal: state,
            denial_reason: Some(denial),
        },
    }
}

fn claim_decision(principal: &Principal, claim_type: ClaimType) -> Result<String, DenialReason> {
    if principal.has_claim(claim_type) {
        Ok(format!("Principal holds claim '{claim_type}' = true"))
    } else {
        Err(missing_claim(claim_type))
    }
}

fn edit_decision(principal: &Principal) -> Result<String, DenialReason> {
    if is_super_admin(principal) {
        return Ok(format!("Member of '{}'", RoleName::SUPER_ADMIN));
    }
    if is_editing_admin(principal) {
        return Ok(format!(
            "Member of '{}' with claim '{}' = true",
            RoleName::ADMIN,
            ClaimType::EditRole
        ));
    }
    if principal.is_in_role(&RoleName::ADMIN) {
        return Err(missing_claim(ClaimType::EditRole));
    }
    Err(DenialReason {
        kind: DenialKind::MissingRole,
        message: format!(
            "Requires role '{}' with claim '{}', or role '{}'",
            RoleName::ADMIN,
            ClaimType::EditRole,
            RoleName::SUPER_ADMIN
        ),
        suggestions: vec![
            format!("Add the user to '{}' and grant '{}'", RoleName::ADMIN, ClaimType::EditRole),
            format!("Add the user to '{}'", RoleName::SUPER_ADMIN),
        ],
    })
}

fn missing_claim(claim_type: ClaimType) -> DenialReason {
    DenialReason {
        kind: DenialKind::MissingClaim,
        message: format!("Missing claim '{claim_type}' = true"),
        suggestions: vec![format!("Grant the '{claim_type}' claim")],
    }
}
