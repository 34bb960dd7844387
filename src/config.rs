//! Run configuration
//!
//! All knobs for a verification run live in one immutable [`VerifyConfig`]
//! that is passed by reference into the selector, reconciler, and reporter.
//! There is no ambient state.

use std::path::PathBuf;

/// Configuration for a single verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Environment scope (e.g. `dev`, `qa2`, `prod`).
    pub environment: String,
    /// Cluster index scope (e.g. `013`).
    pub cluster_index: String,
    /// Source collection name.
    pub entity_collection: String,
    /// Destination collection name.
    pub psm_collection: String,
    /// When set, source users must also carry the requested cluster index.
    /// Destination users are never cluster-filtered.
    pub require_user_cluster_match: bool,
    /// Optional path for the per-tenant summary CSV.
    pub summary_out: Option<PathBuf>,
    /// Optional path for the missing-users CSV.
    pub missing_out: Option<PathBuf>,
}

/// Parse a lenient boolean argument value.
///
/// Accepts `true`/`1`/`yes`/`y` and `false`/`0`/`no`/`n`, case-insensitive.
/// Anything else is a usage error.
pub fn parse_bool_arg(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(format!(
            "expected one of true/1/yes/y or false/0/no/n, got '{other}'"
        )),
    }
}
