//! TOML configuration for the chainlog binary.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.
//!
//! ```toml
//! store_path = "chainlog.jsonl"
//! author = "alice"
//!
//! [list]
//! default_limit = 100
//! max_limit = 1000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use chainlog_contracts::{ChainlogError, ChainlogResult};
use chainlog_core::ListLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainlogConfig {
    /// JSON-lines file backing the ledger.
    pub store_path: PathBuf,

    /// Default author identity when neither `--author` nor
    /// `CHAINLOG_AUTHOR` is set.
    pub author: Option<String>,

    pub list: ListLimits,
}

impl Default for ChainlogConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("chainlog.jsonl"),
            author: None,
            list: ListLimits::default(),
        }
    }
}

impl ChainlogConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `ConfigError` if the TOML is malformed, names an unknown key,
    /// or sets list limits that cannot be satisfied.
    pub fn from_toml_str(s: &str) -> ChainlogResult<Self> {
        let config: ChainlogConfig = toml::from_str(s).map_err(|e| ChainlogError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> ChainlogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ChainlogError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn check(&self) -> ChainlogResult<()> {
        let ListLimits {
            default_limit,
            max_limit,
        } = self.list;
        if default_limit == 0 || default_limit > max_limit {
            return Err(ChainlogError::ConfigError {
                reason: format!(
                    "list.default_limit must be within 1..=max_limit ({max_limit}), got {default_limit}"
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chainlog_contracts::ChainlogError;

    use super::ChainlogConfig;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ChainlogConfig::from_toml_str("").unwrap();
        assert_eq!(config, ChainlogConfig::default());
        assert_eq!(config.list.default_limit, 100);
        assert_eq!(config.list.max_limit, 1000);
    }

    #[test]
    fn full_document_parses() {
        let config = ChainlogConfig::from_toml_str(
            r#"
            store_path = "/var/lib/chainlog/log.jsonl"
            author = "ops-bot"

            [list]
            default_limit = 20
            max_limit = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.store_path.to_str(), Some("/var/lib/chainlog/log.jsonl"));
        assert_eq!(config.author.as_deref(), Some("ops-bot"));
        assert_eq!(config.list.default_limit, 20);
        assert_eq!(config.list.max_limit, 50);
    }

    #[test]
    fn partial_list_table_keeps_other_default() {
        let config = ChainlogConfig::from_toml_str("[list]\nmax_limit = 500\n").unwrap();
        assert_eq!(config.list.default_limit, 100);
        assert_eq!(config.list.max_limit, 500);
    }

    #[test]
    fn inconsistent_limits_rejected() {
        let err = ChainlogConfig::from_toml_str("[list]\ndefault_limit = 10\nmax_limit = 5\n")
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = ChainlogConfig::from_toml_str("stor_path = \"x\"").unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "author = \"from-file\"").unwrap();

        let config = ChainlogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.author.as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ChainlogConfig::from_file(std::path::Path::new("/nonexistent/chainlog.toml"))
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
    }
}
