//! Role permission comparison.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::Environment;

/// Role/operation pairs whose access levels disagree across environments.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionReport {
    pub environments: Vec<String>,
    pub rows: Vec<PermissionRow>,
}

impl PermissionReport {
    pub fn has_differences(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Access levels for one role/operation pair, aligned with the report's
/// environment order. A role or operation absent from an environment
/// renders as `""`.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionRow {
    pub role: String,
    pub operation: String,
    pub access: Vec<String>,
}

/// Compare role permissions across environments, sorted by role then
/// operation.
pub fn compare_role_permissions(environments: &[Environment]) -> PermissionReport {
    let names: Vec<String> = environments.iter().map(|env| env.name.clone()).collect();

    let mut by_role_operation: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
    for (position, environment) in environments.iter().enumerate() {
        for role in &environment.roles {
            for permission in &role.permissions {
                by_role_operation
                    .entry((&role.name, &permission.operation))
                    .or_insert_with(|| vec![String::new(); environments.len()])[position] =
                    permission.access.clone();
            }
        }
    }

    let rows = by_role_operation
        .into_iter()
        .filter(|(_, access)| access.iter().collect::<HashSet<_>>().len() > 1)
        .map(|((role, operation), access)| PermissionRow {
            role: role.to_string(),
            operation: operation.to_string(),
            access,
        })
        .collect();

    PermissionReport {
        environments: names,
        rows,
    }
}
