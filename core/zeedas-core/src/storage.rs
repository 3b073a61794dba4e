//! Storage configuration and path management for Zeedas.
//!
//! All file locations the plugin touches are resolved here, so tests can point
//! the whole engine at a temp directory with [`StorageConfig::with_root`].
//!
//! The root defaults to `~/.zeedas` and can be moved with `ZEEDAS_HOME`.

use std::env;
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "ZEEDAS_HOME";
const ROOT_DIR: &str = ".zeedas";

/// Central configuration for all Zeedas storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all Zeedas data (default: ~/.zeedas)
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        if let Some(root) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Self {
                root: PathBuf::from(root),
            };
        }
        let home = dirs::home_dir().unwrap_or_else(env::temp_dir);
        Self {
            root: home.join(ROOT_DIR),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the root directory for Zeedas data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to config.toml (plugin settings, read-only for the engine).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to the plugin log file written by `zeedas-hook`.
    pub fn log_file(&self) -> PathBuf {
        self.root.join("zeedas-hook.log")
    }

    /// Default location of the activity CLI binary.
    pub fn cli_binary(&self) -> PathBuf {
        let name = if cfg!(windows) {
            "zeedas-cli.exe"
        } else {
            "zeedas-cli"
        };
        self.root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_sets_custom_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/test-zeedas"));
        assert_eq!(config.root(), Path::new("/tmp/test-zeedas"));
    }

    #[test]
    fn test_config_file_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/zeedas"));
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/zeedas/config.toml")
        );
    }

    #[test]
    fn test_log_file_path() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/zeedas"));
        assert_eq!(
            config.log_file(),
            PathBuf::from("/tmp/zeedas/zeedas-hook.log")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_cli_binary_lives_under_root() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/zeedas"));
        assert_eq!(config.cli_binary(), PathBuf::from("/tmp/zeedas/zeedas-cli"));
    }
}
