use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use staffdesk_core::{DomainError, DomainResult, EmployeeId};

use crate::{Department, Employee};

/// An employee not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: Department,
    pub photo_path: Option<String>,
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Ordered by id.
    async fn all(&self) -> DomainResult<Vec<Employee>>;

    async fn get(&self, id: EmployeeId) -> DomainResult<Option<Employee>>;

    /// Assigns the next id and returns the stored record.
    async fn add(&self, employee: NewEmployee) -> DomainResult<Employee>;

    /// `NotFound` if the record vanished.
    async fn update(&self, employee: Employee) -> DomainResult<Employee>;

    async fn delete(&self, id: EmployeeId) -> DomainResult<Option<Employee>>;
}

#[derive(Debug, Default)]
struct Rows {
    next_id: u64,
    by_id: BTreeMap<EmployeeId, Employee>,
}

#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    rows: RwLock<Rows>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with three sample employees (ids 1..=3).
    pub fn with_samples() -> Self {
        let repo = Self::new();
        if let Ok(mut rows) = repo.rows.write() {
            for (name, email, department) in [
                ("Mary", "mary@staffdesk.example", Department::HR),
                ("John", "john@staffdesk.example", Department::IT),
                ("Sam", "sam@staffdesk.example", Department::IT),
            ] {
                rows.insert(NewEmployee {
                    name: name.to_string(),
                    email: email.to_string(),
                    department,
                    photo_path: None,
                });
            }
        }
        repo
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, Rows>> {
        self.rows.read().map_err(|_| DomainError::unexpected("employee store lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, Rows>> {
        self.rows.write().map_err(|_| DomainError::unexpected("employee store lock poisoned"))
    }
}

impl Rows {
    fn insert(&mut self, new: NewEmployee) -> Employee {
        self.next_id += 1;
        let employee = Employee {
            id: EmployeeId::new(self.next_id),
            name: new.name,
            email: new.email,
            department: new.department,
            photo_path: new.photo_path,
        };
        self.by_id.insert(employee.id, employee.clone());
        employee
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn all(&self) -> DomainResult<Vec<Employee>> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    async fn get(&self, id: EmployeeId) -> DomainResult<Option<Employee>> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    async fn add(&self, employee: NewEmployee) -> DomainResult<Employee> {
        Ok(self.write()?.insert(employee))
    }

    async fn update(&self, employee: Employee) -> DomainResult<Employee> {
        let mut rows = self.write()?;
        let slot = rows.by_id.get_mut(&employee.id).ok_or_else(DomainError::not_found)?;
        *slot = employee.clone();
        Ok(employee)
    }

    async fn delete(&self, id: EmployeeId) -> DomainResult<Option<Employee>> {
        Ok(self.write()?.by_id.remove(&id))
    }
}
