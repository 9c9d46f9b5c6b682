//! Custom API key comparison.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Environment;

/// Presence matrix of custom API keys that are missing from at least one
/// environment. Keys defined everywhere are not reported.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyReport {
    pub environments: Vec<String>,
    pub keys: Vec<ApiKeyRow>,
}

impl ApiKeyReport {
    pub fn has_differences(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Per-environment presence of one key, aligned with the report's
/// environment order.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyRow {
    pub key: String,
    pub present: Vec<bool>,
}

/// Compare custom API key sets across environments, sorted by key name.
pub fn compare_api_keys(environments: &[Environment]) -> ApiKeyReport {
    let names: Vec<String> = environments.iter().map(|env| env.name.clone()).collect();

    // BTreeMap keeps the report sorted by key.
    let mut by_key: BTreeMap<&str, Vec<bool>> = BTreeMap::new();
    for (position, environment) in environments.iter().enumerate() {
        for key in &environment.api_keys {
            by_key.entry(key)
                .or_insert_with(|| vec![false; environments.len()])[position] = true;
        }
    }

    let keys = by_key
        .into_iter()
        .filter(|(_, present)| present.iter().any(|found| !found))
        .map(|(key, present)| ApiKeyRow {
            key: key.to_string(),
            present,
        })
        .collect();

    ApiKeyReport {
        environments: names,
        keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(name: &str, api_keys: &[&str]) -> Environment {
        Environment {
            id: format!("{name}-id"),
            name: name.to_string(),
            tables: Vec::new(),
            roles: Vec::new(),
            services: Vec::new(),
            api_keys: api_keys.iter().map(|key| key.to_string()).collect(),
        }
    }

    #[test]
    fn test_key_missing_from_one_environment_is_reported() {
        let report = compare_api_keys(&[
            environment("dev", &["Metrics", "Billing"]),
            environment("stage", &["Metrics", "Billing"]),
            environment("prod", &["Metrics"]),
        ]);

        assert!(report.has_differences());
        assert_eq!(report.keys.len(), 1);
        assert_eq!(report.keys[0].key, "Billing");
        assert_eq!(report.keys[0].present, [true, true, false]);
    }

    #[test]
    fn test_keys_present_everywhere_are_not_reported() {
        let report = compare_api_keys(&[
            environment("dev", &["Metrics"]),
            environment("prod", &["Metrics"]),
        ]);

        assert!(!report.has_differences());
    }

    #[test]
    fn test_rows_are_sorted_by_key() {
        let report = compare_api_keys(&[
            environment("dev", &["Zeta", "Alpha"]),
            environment("prod", &[]),
        ]);

        let keys: Vec<&str> = report.keys.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, ["Alpha", "Zeta"]);
    }
}
