//! Schema snapshot writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use envsync::Environment;
use envsync::model::{Role, Service, Table};

/// On-disk snapshot of one environment's full definition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a> {
    generated_at: DateTime<Utc>,
    environment: &'a str,
    tables: Vec<&'a Table>,
    roles: &'a [Role],
    services: &'a [Service],
    api_keys: &'a [String],
}

/// Write a pretty-printed snapshot of `environment` into `dir`, named after
/// the environment. Tables listed in `tables_to_ignore` are left out.
pub fn write_snapshot(
    environment: &Environment,
    dir: &Path,
    tables_to_ignore: &[String],
) -> Result<PathBuf> {
    let snapshot = Snapshot {
        generated_at: Utc::now(),
        environment: &environment.name,
        tables: environment
            .tables
            .iter()
            .filter(|table| !tables_to_ignore.contains(&table.name))
            .collect(),
        roles: &environment.roles,
        services: &environment.services,
        api_keys: &environment.api_keys,
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", environment.name));
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envsync::model::Column;
    use serde_json::Value;

    fn environment() -> Environment {
        Environment {
            id: "app-dev".to_string(),
            name: "dev".to_string(),
            tables: vec![
                Table {
                    name: "Book".to_string(),
                    columns: vec![Column::new("title", "STRING")],
                    relations: Vec::new(),
                    geo_relations: Vec::new(),
                },
                Table {
                    name: "Scratch".to_string(),
                    columns: Vec::new(),
                    relations: Vec::new(),
                    geo_relations: Vec::new(),
                },
            ],
            roles: Vec::new(),
            services: Vec::new(),
            api_keys: vec!["reporting".to_string()],
        }
    }

    #[test]
    fn test_snapshot_is_named_after_environment() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_snapshot(&environment(), dir.path(), &[]).unwrap();

        assert_eq!(path, dir.path().join("dev.json"));
        assert!(path.exists());
    }

    #[test]
    fn test_snapshot_contents_and_ignore_list() {
        let dir = tempfile::tempdir().unwrap();
        let ignore = vec!["Scratch".to_string()];

        let path = write_snapshot(&environment(), dir.path(), &ignore).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["environment"], "dev");
        assert_eq!(value["tables"].as_array().unwrap().len(), 1);
        assert_eq!(value["tables"][0]["name"], "Book");
        assert_eq!(value["apiKeys"][0], "reporting");
        assert!(value["generatedAt"].is_string());
    }

    #[test]
    fn test_snapshot_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports/schema");

        let path = write_snapshot(&environment(), &nested, &[]).unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
