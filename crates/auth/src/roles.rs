use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name as carried by a principal.
///
/// Roles are opaque strings at this layer; only the two names below carry
/// meaning for policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub const ADMIN: RoleName = RoleName(Cow::Borrowed("Admin"));
    pub const SUPER_ADMIN: RoleName = RoleName(Cow::Borrowed("Super Admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
