//! Author identity resolution.
//!
//! The ledger never accepts an author from entry content; the binary
//! resolves it here, in priority order: `--author` flag, `CHAINLOG_AUTHOR`
//! environment variable, then the config file.

use chainlog_contracts::{ChainlogError, ChainlogResult};

pub const AUTHOR_ENV: &str = "CHAINLOG_AUTHOR";

/// Pick the first non-blank candidate, trimmed.
pub fn resolve_author(
    flag: Option<&str>,
    env: Option<&str>,
    configured: Option<&str>,
) -> ChainlogResult<String> {
    [flag, env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ChainlogError::validation(
                "author",
                format!("no identity: pass --author, set {AUTHOR_ENV}, or set `author` in the config"),
            )
        })
}

#[cfg(test)]
mod tests {
    use chainlog_contracts::ChainlogError;

    use super::resolve_author;

    #[test]
    fn flag_wins_over_env_and_config() {
        let author = resolve_author(Some("flag"), Some("env"), Some("cfg")).unwrap();
        assert_eq!(author, "flag");
    }

    #[test]
    fn blank_candidates_are_skipped() {
        let author = resolve_author(Some("  "), None, Some(" cfg ")).unwrap();
        assert_eq!(author, "cfg");
    }

    #[test]
    fn no_identity_is_validation_error() {
        match resolve_author(None, Some(""), None) {
            Err(ChainlogError::Validation { field, .. }) => assert_eq!(field, "author"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
