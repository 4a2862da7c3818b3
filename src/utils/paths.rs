//! Well-known locations under `~/.accessctl/`.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Per-user directory for config and the local request store (~/.accessctl/).
pub fn accessctl_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".accessctl"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(accessctl_home()?.join("config.yaml"))
}

pub fn default_data_path() -> Result<PathBuf> {
    Ok(accessctl_home()?.join("requests.json"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_share_home() {
        let config = default_config_path().unwrap();
        let data = default_data_path().unwrap();
        assert_eq!(config.parent(), data.parent());
        assert!(config.ends_with(".accessctl/config.yaml"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel/path"), PathBuf::from("rel/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.json"), home.join("x.json"));
        }
    }
}
