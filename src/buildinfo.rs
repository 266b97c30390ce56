//! Build-time version information.

/// Semantic version of the build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash injected at build time via the `VERDICT_COMMIT`
/// environment variable.
pub const COMMIT: Option<&str> = option_env!("VERDICT_COMMIT");

/// Formatted version string, with a short commit hash when available.
pub fn version_string() -> String {
    match COMMIT {
        Some(commit) if commit.len() >= 7 => format!("{VERSION} ({})", &commit[..7]),
        _ => VERSION.to_string(),
    }
}
