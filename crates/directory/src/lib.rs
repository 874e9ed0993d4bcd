//! Role/user directory facade.
//!
//! The identity subsystem owns roles, users, memberships and claims. Workflow
//! code only ever talks to it through [`RoleDirectory`] and [`UserDirectory`].

pub mod facade;
pub mod memory;
pub mod model;
pub mod table;

pub use facade::{RoleDirectory, UserDirectory};
pub use memory::InMemoryIdentityStore;
pub use model::{Role, User};
pub use table::Table;
