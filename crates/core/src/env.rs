//! Allow-list environment overlay for run parameters.
//!
//! A run's free-form parameters must never be able to inject arbitrary
//! variables (e.g. `LD_PRELOAD`) into a child process. The worker inherits
//! its own environment and overlays only the keys listed here.

use serde_json::Value;

/// Parameter keys that may be forwarded to a child process's environment.
///
/// Keep this an explicit, reviewable list; do not pass parameters through
/// wholesale.
pub const ENV_ALLOWLIST: &[&str] = &["message", "target", "environment", "region"];

/// Build the environment overlay for a run's parameters.
///
/// Returns the `(key, value)` pairs to set on the child process, in the
/// order they appear in `params`. Keys not on [`ENV_ALLOWLIST`] and values
/// that are not JSON strings are silently dropped.
pub fn allowlisted_overlay(params: &Value) -> Vec<(String, String)> {
    let Some(map) = params.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter(|(key, _)| ENV_ALLOWLIST.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            value
                .as_str()
                .map(|v| (key.clone(), v.to_string()))
        })
        .collect()
}
