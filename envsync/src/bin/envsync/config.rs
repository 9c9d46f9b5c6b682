use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run configuration loaded from `envsync.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvsyncConfig {
    pub console: ConsoleSettings,
    pub environments: EnvironmentSettings,
    #[serde(default)]
    pub compare: CompareSettings,
}

/// Console endpoint and account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSettings {
    pub url: String,
    pub username: String,
    /// Plain value or `${VAR}` to read from the environment
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_password() -> String {
    "${ENVSYNC_PASSWORD}".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Which environments a run covers: the source of truth and its targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    pub source: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareSettings {
    /// Column names excluded from comparison beyond the fixed system set
    #[serde(default)]
    pub columns_to_ignore: Vec<String>,
    /// Table names excluded from schema dumps (not from comparison)
    #[serde(default)]
    pub tables_to_ignore: Vec<String>,
}

impl EnvsyncConfig {
    /// Load the config from an explicit path, or find `envsync.toml` in the
    /// current directory or any ancestor.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let current_dir =
                    std::env::current_dir().context("Failed to get current directory")?;
                Self::find_config_file(&current_dir)?
            }
        };
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    fn find_config_file(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join("envsync.toml");
            if candidate.exists() {
                return Ok(candidate);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find envsync.toml in {start:?} or any parent directory. \
                     Create one or pass --config."
                );
            }
        }
    }

    /// Console password, expanding a `${VAR}` reference against the
    /// process environment.
    pub fn password(&self) -> Result<String> {
        let raw = self.console.password.as_str();

        if raw.starts_with("${") && raw.ends_with('}') {
            let var_name = &raw[2..raw.len() - 1];
            std::env::var(var_name)
                .with_context(|| format!("Environment variable {var_name} not set"))
        } else {
            Ok(raw.to_string())
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.console.timeout_secs)
    }

    /// Every environment id of the run, source first.
    pub fn app_ids(&self) -> Vec<&str> {
        std::iter::once(self.environments.source.as_str())
            .chain(self.environments.targets.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [console]
        url = "http://localhost:3000"
        username = "ops@example.com"

        [environments]
        source = "app-dev"
        targets = ["app-stage", "app-prod"]

        [compare]
        columns_to_ignore = ["legacyFlag"]
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let config: EnvsyncConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.console.password, "${ENVSYNC_PASSWORD}");
        assert_eq!(config.console.timeout_secs, 30);
        assert_eq!(config.compare.columns_to_ignore, ["legacyFlag"]);
        assert!(config.compare.tables_to_ignore.is_empty());
    }

    #[test]
    fn test_app_ids_put_source_first() {
        let config: EnvsyncConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.app_ids(), ["app-dev", "app-stage", "app-prod"]);
    }

    #[test]
    fn test_literal_password_passes_through() {
        let mut config: EnvsyncConfig = toml::from_str(SAMPLE).unwrap();
        config.console.password = "hunter2".to_string();

        assert_eq!(config.password().unwrap(), "hunter2");
    }

    #[test]
    fn test_config_discovery_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("envsync.toml"), SAMPLE).unwrap();

        let found = EnvsyncConfig::find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("envsync.toml"));
    }
}
