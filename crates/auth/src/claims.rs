//! Claim catalog.
//!
//! The set of claim types an administrator can grant is fixed at compile time.
//! Claim values are two-state and travel as the strings `"true"` / `"false"`.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recognized claim type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimType {
    #[serde(rename = "Create Role")]
    CreateRole,
    #[serde(rename = "Edit Role")]
    EditRole,
    #[serde(rename = "Delete Role")]
    DeleteRole,
}

impl ClaimType {
    /// Every known claim type, in presentation order.
    pub const ALL: [ClaimType; 3] = [ClaimType::CreateRole, ClaimType::EditRole, ClaimType::DeleteRole];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::CreateRole => "Create Role",
            ClaimType::EditRole => "Edit Role",
            ClaimType::DeleteRole => "Delete Role",
        }
    }
}

impl core::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown claim type '{0}'")]
pub struct UnknownClaimType(pub String);

impl FromStr for ClaimType {
    type Err = UnknownClaimType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownClaimType(s.to_string()))
    }
}

/// A `(type, value)` pair attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    #[serde(with = "flag")]
    pub value: bool,
}

impl Claim {
    pub fn new(claim_type: ClaimType, value: bool) -> Self {
        Self { claim_type, value }
    }

    /// Claim of the given type with value `"true"`.
    pub fn granted(claim_type: ClaimType) -> Self {
        Self::new(claim_type, true)
    }

    pub fn grants(&self, claim_type: ClaimType) -> bool {
        self.claim_type == claim_type && self.value
    }
}

impl core::fmt::Display for Claim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.claim_type, self.value)
    }
}

mod flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(D::Error::custom(format!("invalid claim value '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_stable() {
        let names: Vec<&str> = ClaimType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["Create Role", "Edit Role", "Delete Role"]);
    }

    #[test]
    fn claim_type_parses_display_name() {
        assert_eq!("Edit Role".parse::<ClaimType>().unwrap(), ClaimType::EditRole);
        assert!("Edit role".parse::<ClaimType>().is_err());
    }

    #[test]
    fn claim_serializes_value_as_string() {
        let json = serde_json::to_value(Claim::granted(ClaimType::DeleteRole)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "Delete Role", "value": "true" }));
    }

    #[test]
    fn misspelled_false_is_rejected() {
        let raw = r#"{ "type": "Create Role", "value": "fasle" }"#;
        assert!(serde_json::from_str::<Claim>(raw).is_err());
    }

    #[test]
    fn display_matches_type_colon_value() {
        assert_eq!(Claim::new(ClaimType::CreateRole, false).to_string(), "Create Role: false");
    }
}
