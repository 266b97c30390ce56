//! Test suite and schema loading.
//!
//! Inputs are validated at load time: unreadable files and syntactically
//! invalid JSON are configuration errors, raised before any test executes.

use crate::error::{EvalError, EvalResult};
use crate::types::TestCase;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load test cases from a JSON file containing an array of
/// `{name, input, expected}` records.
pub fn load_tests(path: &Path) -> EvalResult<Vec<TestCase>> {
    let data = fs::read_to_string(path).map_err(|e| {
        EvalError::configuration_error(format!("failed to read test file {}: {e}", path.display()))
    })?;

    let tests: Vec<TestCase> = serde_json::from_str(&data).map_err(|e| {
        EvalError::configuration_error(format!("failed to parse test file {}: {e}", path.display()))
    })?;

    Ok(tests)
}

/// Load a JSON schema from a file.
///
/// The schema is only checked for syntactic validity; its content is passed
/// through to the completion endpoint opaquely.
pub fn load_schema(path: &Path) -> EvalResult<Value> {
    let data = fs::read_to_string(path).map_err(|e| {
        EvalError::configuration_error(format!(
            "failed to read schema file {}: {e}",
            path.display()
        ))
    })?;

    let schema: Value = serde_json::from_str(&data).map_err(|e| {
        EvalError::configuration_error(format!("invalid JSON in schema file {}: {e}", path.display()))
    })?;

    Ok(schema)
}
