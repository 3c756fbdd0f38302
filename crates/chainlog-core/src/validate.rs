//! Field validators applied before an entry is hashed or stored.
//!
//! Each field has its own check so a failure names exactly one field.

use chainlog_contracts::{ChainlogError, ChainlogResult, NewEntry};

/// Inclusive upper bound for `node_code`.
pub const NODE_CODE_MAX: i64 = 99;

/// Inclusive upper bound for `input_code`.
pub const INPUT_CODE_MAX: i64 = 999;

pub fn validate_author(author: &str) -> ChainlogResult<()> {
    if author.trim().is_empty() {
        return Err(ChainlogError::validation("author", "must not be empty"));
    }
    Ok(())
}

pub fn validate_body(body: &str) -> ChainlogResult<()> {
    if body.is_empty() {
        return Err(ChainlogError::validation("body", "must not be empty"));
    }
    Ok(())
}

pub fn validate_node_code(code: Option<i64>) -> ChainlogResult<()> {
    match code {
        Some(c) if !(0..=NODE_CODE_MAX).contains(&c) => Err(ChainlogError::validation(
            "node_code",
            format!("must be within 0..={NODE_CODE_MAX}, got {c}"),
        )),
        _ => Ok(()),
    }
}

pub fn validate_input_code(code: Option<i64>) -> ChainlogResult<()> {
    match code {
        Some(c) if !(0..=INPUT_CODE_MAX).contains(&c) => Err(ChainlogError::validation(
            "input_code",
            format!("must be within 0..={INPUT_CODE_MAX}, got {c}"),
        )),
        _ => Ok(()),
    }
}

/// Run every stateless check on `entry`, stopping at the first failure.
///
/// `supersedes_id` needs a store lookup and is checked by the ledger.
pub fn validate_new_entry(entry: &NewEntry) -> ChainlogResult<()> {
    validate_author(&entry.author)?;
    validate_body(&entry.body)?;
    validate_node_code(entry.node_code)?;
    validate_input_code(entry.input_code)?;
    Ok(())
}
