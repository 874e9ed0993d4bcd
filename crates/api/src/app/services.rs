//! Service wiring: in-memory identity directory, employee store, photo assets.

use std::sync::Arc;

use thiserror::Error;

use staffdesk_admin::Administration;
use staffdesk_core::DomainError;
use staffdesk_directory::{InMemoryIdentityStore, Role, RoleDirectory, User, UserDirectory};
use staffdesk_employees::{
    AssetError, EmployeeService, IdProtector, InMemoryEmployeeRepository, LocalAssetStore, ProtectError,
};

use crate::config::{ApiConfig, BootstrapAdmin};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("photo store: {0}")]
    Assets(#[from] AssetError),

    #[error("employee id key: {0}")]
    IdKey(#[from] ProtectError),

    #[error("seeding identity directory: {0}")]
    Seed(#[from] DomainError),
}

pub struct AppServices {
    pub admin: Administration,
    pub employees: EmployeeService,
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StartupError> {
    let identity = Arc::new(InMemoryIdentityStore::new());
    seed_identity(&identity, config.bootstrap_admin.as_ref()).await?;

    let assets = Arc::new(LocalAssetStore::new(&config.asset_root).await?);
    let ids = IdProtector::for_employee_ids(&config.employee_id_key)?;
    let employees = EmployeeService::new(Arc::new(InMemoryEmployeeRepository::with_samples()), assets, ids);

    Ok(AppServices {
        admin: Administration::new(identity.clone(), identity),
        employees,
    })
}

/// Both policy-relevant roles always exist; the bootstrap user joins "Super Admin".
async fn seed_identity(store: &InMemoryIdentityStore, admin: Option<&BootstrapAdmin>) -> Result<(), DomainError> {
    for name in ["Admin", "Super Admin"] {
        RoleDirectory::create(store, Role::new(name)).await?;
    }

    if let Some(admin) = admin {
        let user = User::new(&admin.username, &admin.email);
        UserDirectory::create(store, user.clone()).await?;
        store.add_to_roles(&user, &["Super Admin".to_string()]).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "bootstrap super admin seeded");
    }
    Ok(())
}
