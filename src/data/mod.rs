// SPDX-License-Identifier: MIT

//! Employee roster loading
//!
//! The engine only sees the [`EmployeeSource`] trait; the YAML-backed
//! [`Roster`] is the production implementation, tests substitute fixed
//! in-memory rosters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flow::state::Employee;

/// Synchronous, side-effect-free employee lookup by department.
///
/// Implementations return a fresh snapshot on every call; the core never
/// mutates employee records.
pub trait EmployeeSource: Send + Sync {
    fn employees_of(&self, department: &str) -> Vec<Employee>;
}

/// Errors loading a roster file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Company-wide employee roster parsed from a YAML file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Roster {
    pub employees: Vec<Employee>,
}

impl Roster {
    /// Load a roster from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a roster from a YAML string.
    pub fn parse_yaml(content: &str) -> Result<Self, DataError> {
        let roster: Roster = serde_yaml::from_str(content)?;
        Ok(roster)
    }

    /// Roster with a fixed employee list, mainly for tests and demos.
    pub fn from_employees(employees: Vec<Employee>) -> Self {
        Self { employees }
    }
}

impl EmployeeSource for Roster {
    fn employees_of(&self, department: &str) -> Vec<Employee> {
        self.employees
            .iter()
            .filter(|e| e.department == department)
            .cloned()
            .collect()
    }
}
