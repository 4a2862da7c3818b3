//! YAML configuration for accessctl.
//!
//! # Example config file (`~/.accessctl/config.yaml`):
//! ```yaml
//! parent: projects/320306361664
//! data_file: ~/approvals/requests.json
//! default_state: pending
//! page_size: 100
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use crate::source::{StateFilter, DEFAULT_PAGE_SIZE};
use crate::utils::paths;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PARENT_KINDS: [&str; 3] = ["projects", "folders", "organizations"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Resource whose approval requests we manage, e.g. `projects/123`.
    pub parent: String,
    /// Local request store. Defaults to `~/.accessctl/requests.json`.
    pub data_file: Option<String>,
    pub default_state: StateFilter,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parent: "projects/default".to_string(),
            data_file: None,
            default_state: StateFilter::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Values given on the command line (or via environment variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub parent: Option<String>,
    pub data_file: Option<PathBuf>,
}

impl Config {
    /// Check field values. Called after parsing and after applying overrides.
    pub fn validate(&self) -> Result<()> {
        let mut parts = self.parent.splitn(2, '/');
        let kind = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        if !PARENT_KINDS.contains(&kind) || id.is_empty() || id.contains('/') {
            bail!(
                "Invalid parent '{}': expected projects/<id>, folders/<id> or organizations/<id>",
                self.parent
            );
        }
        if self.page_size == 0 {
            bail!("Invalid page_size: must be greater than 0");
        }
        Ok(())
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(parent) = overrides.parent {
            self.parent = parent;
        }
        if let Some(data_file) = overrides.data_file {
            self.data_file = Some(data_file.display().to_string());
        }
        self.validate()?;
        Ok(self)
    }

    /// Resolved path of the local request store.
    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(paths::expand_home(path)),
            None => paths::default_data_path(),
        }
    }
}

/// Parse a config from a YAML string.
pub fn parse_config_str(yaml: &str) -> Result<Config> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
    config.validate()?;
    Ok(config)
}

/// Load the config file.
///
/// An explicit `path` must exist. Without one, `~/.accessctl/config.yaml` is
/// used if present, otherwise defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (paths::default_config_path()?, false),
    };

    if !path.exists() {
        if required {
            bail!("Config file not found: {}", path.display());
        }
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
parent: projects/320306361664
data_file: /tmp/requests.json
default_state: all
page_size: 10
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.parent, "projects/320306361664");
        assert_eq!(config.default_state, StateFilter::All);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/tmp/requests.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config_str("parent: folders/42\n").unwrap();
        assert_eq!(config.default_state, StateFilter::Pending);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(parse_config_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config_str("parent: buckets/1\n").is_err());
        assert!(parse_config_str("parent: projects/\n").is_err());
        assert!(parse_config_str("page_size: 0\n").is_err());
        assert!(parse_config_str("default_state: sometimes\n").is_err());
        assert!(parse_config_str("colour: blue\n").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::default()
            .apply(Overrides {
                parent: Some("organizations/7".to_string()),
                data_file: Some(PathBuf::from("/data/r.json")),
            })
            .unwrap();
        assert_eq!(config.parent, "organizations/7");
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/data/r.json"));

        let bad = Config::default().apply(Overrides {
            parent: Some("nope".to_string()),
            data_file: None,
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(load_config(Some(&tmp.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "parent: projects/abc\npage_size: 5\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.parent, "projects/abc");
        assert_eq!(config.page_size, 5);
    }
}
