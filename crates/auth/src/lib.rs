//! `staffdesk-auth`: pure authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows the
//! claim catalog, what a principal looks like, and which policies an
//! administrative action requires.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{
    authorize, evaluate, explain, AuthzError, DenialKind, Policy, PolicyContext, PolicyExplanation,
};
pub use claims::{Claim, ClaimType, UnknownClaimType};
pub use principal::Principal;
pub use roles::RoleName;
pub use token::{AccessTokenClaims, Hs256JwtValidator, JwtValidator, TokenValidationError, validate_claims};
