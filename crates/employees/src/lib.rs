//! Employee records with a photo asset, addressed publicly by opaque ids.

pub mod assets;
pub mod error;
pub mod model;
pub mod protect;
pub mod repository;
pub mod service;

pub use assets::{AssetError, AssetStore, InMemoryAssetStore, LocalAssetStore};
pub use error::{EmployeeError, EmployeeResult};
pub use model::{Department, EditEmployeeView, Employee, EmployeeInput, EmployeeView, PhotoUpload};
pub use protect::{EMPLOYEE_ID_PURPOSE, IdProtector, ProtectError};
pub use repository::{EmployeeRepository, InMemoryEmployeeRepository, NewEmployee};
pub use service::EmployeeService;
