use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use staffdesk_core::{EmployeeId, Entity};

use crate::EmployeeError;

pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    HR,
    Payroll,
    IT,
}

impl Department {
    pub const ALL: [Department; 3] = [Department::HR, Department::Payroll, Department::IT];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::HR => "HR",
            Department::Payroll => "Payroll",
            Department::IT => "IT",
        }
    }
}

impl FromStr for Department {
    type Err = EmployeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| EmployeeError::Validation(vec![format!("Department '{s}' is not recognized.")]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: Department,
    /// Stored asset name, not a filesystem path.
    pub photo_path: Option<String>,
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Submitted create/edit fields, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<Department>,
}

/// Fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmployee {
    pub name: String,
    pub email: String,
    pub department: Department,
}

impl EmployeeInput {
    pub fn validate(&self) -> Result<ValidEmployee, EmployeeError> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty() {
            errors.push("The Name field is required.".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(format!("Name cannot exceed {MAX_NAME_LEN} characters"));
        }
        if email.is_empty() {
            errors.push("The Email field is required.".to_string());
        } else if !looks_like_email(email) {
            errors.push("Invalid email format".to_string());
        }
        if self.department.is_none() {
            errors.push("The Department field is required.".to_string());
        }

        match (errors.is_empty(), self.department) {
            (true, Some(department)) => Ok(ValidEmployee {
                name: name.to_string(),
                email: email.to_string(),
                department,
            }),
            _ => Err(EmployeeError::Validation(errors)),
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
        && !email.chars().any(char::is_whitespace)
}

/// An uploaded photo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    /// `<uuid>_<file name>`, with the client's name reduced to a safe basename.
    pub fn unique_name(&self) -> String {
        format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&self.file_name))
    }
}

fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "photo".to_string() } else { cleaned.to_string() }
}

/// Public shape of an employee: the numeric id is replaced by its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub photo_path: Option<String>,
}

impl EmployeeView {
    pub fn new(token: String, employee: Employee) -> Self {
        Self {
            id: token,
            name: employee.name,
            email: employee.email,
            department: employee.department,
            photo_path: employee.photo_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditEmployeeView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub existing_photo_path: Option<String>,
}
