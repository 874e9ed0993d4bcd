//! Administration workflows: roles, users, memberships and claims.
//!
//! Every workflow is a present/submit pair. Present phases return a view
//! snapshot; submit phases re-fetch, mutate through the directory facade and
//! answer with a [`Redirect`]. Policy checks happen here, not in the HTTP layer.

use std::sync::Arc;

use staffdesk_directory::{RoleDirectory, UserDirectory};

pub mod error;
pub mod forms;
pub mod membership;
pub mod outcome;
pub mod roles;
pub mod users;

pub use error::{AdminError, AdminResult};
pub use outcome::Redirect;

/// Entry point for all administration workflows.
#[derive(Clone)]
pub struct Administration {
    roles: Arc<dyn RoleDirectory>,
    users: Arc<dyn UserDirectory>,
}

impl Administration {
    pub fn new(roles: Arc<dyn RoleDirectory>, users: Arc<dyn UserDirectory>) -> Self {
        Self { roles, users }
    }
}
