use std::sync::Arc;

use tracing::{info, warn};

use staffdesk_core::EmployeeId;

use crate::error::{EmployeeError, EmployeeResult};
use crate::model::{EditEmployeeView, Employee, EmployeeInput, EmployeeView, PhotoUpload};
use crate::{AssetStore, EmployeeRepository, IdProtector, NewEmployee};

/// Employee workflows, addressed by opaque tokens.
#[derive(Clone)]
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
    assets: Arc<dyn AssetStore>,
    ids: IdProtector,
}

impl EmployeeService {
    pub fn new(repo: Arc<dyn EmployeeRepository>, assets: Arc<dyn AssetStore>, ids: IdProtector) -> Self {
        Self { repo, assets, ids }
    }

    pub fn token_for(&self, id: EmployeeId) -> String {
        self.ids.protect(id)
    }

    pub async fn list(&self) -> EmployeeResult<Vec<EmployeeView>> {
        let employees = self.repo.all().await?;
        Ok(employees.into_iter().map(|e| self.view(e)).collect())
    }

    pub async fn details(&self, token: &str) -> EmployeeResult<EmployeeView> {
        let employee = self.locate(token).await?;
        Ok(self.view(employee))
    }

    pub async fn edit_form(&self, token: &str) -> EmployeeResult<EditEmployeeView> {
        let employee = self.locate(token).await?;
        Ok(EditEmployeeView {
            id: token.to_string(),
            name: employee.name,
            email: employee.email,
            department: employee.department,
            existing_photo_path: employee.photo_path,
        })
    }

    pub async fn create(&self, input: EmployeeInput, photo: Option<PhotoUpload>) -> EmployeeResult<EmployeeView> {
        let fields = input.validate()?;
        let photo_path = match photo {
            Some(upload) => Some(self.store_photo(upload).await?),
            None => None,
        };

        let added = self
            .repo
            .add(NewEmployee {
                name: fields.name,
                email: fields.email,
                department: fields.department,
                photo_path: photo_path.clone(),
            })
            .await;
        let employee = match added {
            Ok(employee) => employee,
            Err(err) => {
                self.discard_photo(photo_path.as_deref()).await;
                return Err(err.into());
            }
        };

        info!(employee_id = %employee.id, "employee created");
        Ok(self.view(employee))
    }

    /// A new photo replaces the old one: the old asset is deleted, then the
    /// new one written. If the record update fails, the new asset is removed.
    pub async fn update(
        &self,
        token: &str,
        input: EmployeeInput,
        photo: Option<PhotoUpload>,
    ) -> EmployeeResult<EmployeeView> {
        let mut employee = self.locate(token).await?;
        let fields = input.validate()?;

        employee.name = fields.name;
        employee.email = fields.email;
        employee.department = fields.department;

        let mut fresh_photo = None;
        if let Some(upload) = photo {
            if let Some(old) = employee.photo_path.as_deref() {
                self.assets.delete(old).await?;
            }
            let name = self.store_photo(upload).await?;
            employee.photo_path = Some(name.clone());
            fresh_photo = Some(name);
        }

        let updated = match self.repo.update(employee).await {
            Ok(updated) => updated,
            Err(err) => {
                self.discard_photo(fresh_photo.as_deref()).await;
                return Err(match err {
                    staffdesk_core::DomainError::NotFound => EmployeeError::not_found(token),
                    other => other.into(),
                });
            }
        };

        info!(employee_id = %updated.id, photo_replaced = fresh_photo.is_some(), "employee updated");
        Ok(self.view(updated))
    }

    /// Removes the record, then its photo.
    pub async fn delete(&self, token: &str) -> EmployeeResult<()> {
        let id = self.ids.unprotect(token).map_err(|e| EmployeeError::bad_token(token, e))?;
        let removed = self.repo.delete(id).await?.ok_or_else(|| EmployeeError::not_found(token))?;

        if let Some(photo) = removed.photo_path.as_deref() {
            if let Err(err) = self.assets.delete(photo).await {
                warn!(employee_id = %removed.id, %photo, error = %err, "photo left behind after delete");
            }
        }
        info!(employee_id = %removed.id, "employee deleted");
        Ok(())
    }

    async fn locate(&self, token: &str) -> EmployeeResult<Employee> {
        let id = self.ids.unprotect(token).map_err(|e| EmployeeError::bad_token(token, e))?;
        self.repo.get(id).await?.ok_or_else(|| EmployeeError::not_found(token))
    }

    async fn store_photo(&self, upload: PhotoUpload) -> EmployeeResult<String> {
        let name = upload.unique_name();
        self.assets.write(&name, upload.bytes).await?;
        Ok(name)
    }

    async fn discard_photo(&self, name: Option<&str>) {
        if let Some(name) = name {
            if let Err(err) = self.assets.delete(name).await {
                warn!(%name, error = %err, "orphaned photo could not be removed");
            }
        }
    }

    fn view(&self, employee: Employee) -> EmployeeView {
        EmployeeView::new(self.ids.protect(employee.id), employee)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use staffdesk_core::{DomainError, DomainResult};

    use super::*;
    use crate::{Department, InMemoryAssetStore, InMemoryEmployeeRepository};

    fn input(name: &str) -> EmployeeInput {
        EmployeeInput {
            name: name.to_string(),
            email: format!("{}@corp.example", name.to_lowercase()),
            department: Some(Department::IT),
        }
    }

    fn service_with(repo: Arc<dyn EmployeeRepository>, assets: Arc<InMemoryAssetStore>) -> EmployeeService {
        EmployeeService::new(repo, assets, IdProtector::for_employee_ids("unit-test-key").unwrap())
    }

    /// Fails `update` once when armed.
    struct BrittleRepo {
        inner: InMemoryEmployeeRepository,
        fail_update: AtomicBool,
    }

    #[async_trait]
    impl EmployeeRepository for BrittleRepo {
        async fn all(&self) -> DomainResult<Vec<Employee>> {
            self.inner.all().await
        }
        async fn get(&self, id: EmployeeId) -> DomainResult<Option<Employee>> {
            self.inner.get(id).await
        }
        async fn add(&self, employee: NewEmployee) -> DomainResult<Employee> {
            self.inner.add(employee).await
        }
        async fn update(&self, employee: Employee) -> DomainResult<Employee> {
            if self.fail_update.swap(false, Ordering::SeqCst) {
                return Err(DomainError::unexpected("disk full"));
            }
            self.inner.update(employee).await
        }
        async fn delete(&self, id: EmployeeId) -> DomainResult<Option<Employee>> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn create_stores_photo_and_exposes_token() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let service = service_with(Arc::new(InMemoryEmployeeRepository::new()), assets.clone());

        let view = service.create(input("Ann"), Some(PhotoUpload::new("ann.png", vec![1]))).await.unwrap();

        let photo = view.photo_path.clone().unwrap();
        assert!(photo.ends_with("_ann.png"));
        assert_eq!(assets.get(&photo), Some(vec![1]));
        assert_ne!(view.id, "1");
        assert_eq!(service.details(&view.id).await.unwrap(), view);
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let service = service_with(Arc::new(InMemoryEmployeeRepository::new()), assets.clone());

        let err = service
            .create(EmployeeInput::default(), Some(PhotoUpload::new("x.png", vec![1])))
            .await
            .unwrap_err();

        assert!(matches!(err, EmployeeError::Validation(_)));
        assert!(assets.names().is_empty());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tampered_token_is_not_found() {
        let service = service_with(Arc::new(InMemoryEmployeeRepository::with_samples()), Arc::new(InMemoryAssetStore::new()));
        let mut token = service.token_for(EmployeeId::new(1));
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(service.details(&token).await, Err(EmployeeError::NotFound(_))));
        assert!(matches!(service.details("garbage").await, Err(EmployeeError::NotFound(_))));
    }

    #[tokio::test]
    async fn replacing_photo_deletes_the_old_asset() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let service = service_with(Arc::new(InMemoryEmployeeRepository::new()), assets.clone());
        let first = service.create(input("Ann"), Some(PhotoUpload::new("a.png", vec![1]))).await.unwrap();
        let old = first.photo_path.clone().unwrap();

        let second = service
            .update(&first.id, input("Ann"), Some(PhotoUpload::new("b.png", vec![2])))
            .await
            .unwrap();

        let new = second.photo_path.unwrap();
        assert_eq!(assets.names(), vec![new.clone()]);
        assert!(new.ends_with("_b.png"));
        assert!(assets.get(&old).is_none());
    }

    #[tokio::test]
    async fn update_without_photo_keeps_existing_asset() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let service = service_with(Arc::new(InMemoryEmployeeRepository::new()), assets.clone());
        let created = service.create(input("Ann"), Some(PhotoUpload::new("a.png", vec![1]))).await.unwrap();

        let mut changed = input("Annabel");
        changed.department = Some(Department::HR);
        let updated = service.update(&created.id, changed, None).await.unwrap();

        assert_eq!(updated.name, "Annabel");
        assert_eq!(updated.department, Department::HR);
        assert_eq!(updated.photo_path, created.photo_path);
    }

    #[tokio::test]
    async fn failed_update_removes_the_new_asset() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let repo = Arc::new(BrittleRepo { inner: InMemoryEmployeeRepository::new(), fail_update: AtomicBool::new(false) });
        let service = service_with(repo.clone(), assets.clone());
        let created = service.create(input("Ann"), None).await.unwrap();

        repo.fail_update.store(true, Ordering::SeqCst);
        let err = service
            .update(&created.id, input("Ann"), Some(PhotoUpload::new("b.png", vec![2])))
            .await
            .unwrap_err();

        assert!(matches!(err, EmployeeError::Unexpected(_)));
        assert!(assets.names().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_record_and_photo() {
        let assets = Arc::new(InMemoryAssetStore::new());
        let service = service_with(Arc::new(InMemoryEmployeeRepository::new()), assets.clone());
        let created = service.create(input("Ann"), Some(PhotoUpload::new("a.png", vec![1]))).await.unwrap();

        service.delete(&created.id).await.unwrap();

        assert!(assets.names().is_empty());
        assert!(matches!(service.details(&created.id).await, Err(EmployeeError::NotFound(_))));
        let err = service.delete(&created.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Employee with Id = {} cannot be found", created.id));
    }

    #[tokio::test]
    async fn edit_form_reports_existing_photo() {
        let service = service_with(Arc::new(InMemoryEmployeeRepository::with_samples()), Arc::new(InMemoryAssetStore::new()));
        let token = service.token_for(EmployeeId::new(2));
        let form = service.edit_form(&token).await.unwrap();
        assert_eq!(form.name, "John");
        assert_eq!(form.existing_photo_path, None);
        assert_eq!(form.id, token);
    }
}
