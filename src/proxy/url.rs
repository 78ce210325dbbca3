//! Backend URL construction.

use crate::config::{API_BASE_ENV, API_BASE_ENV_COMPAT};

/// Joins `base` and `path` with exactly one `/` between them.
///
/// Trailing slashes on the base and leading slashes on the path are
/// collapsed. An empty base yields a root-relative path.
pub fn build_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// The configured backend base, read from the environment on each call.
/// Empty when unset. This is what `ApiBase::Env` resolves to.
pub fn api_base() -> String {
    std::env::var(API_BASE_ENV)
        .or_else(|_| std::env::var(API_BASE_ENV_COMPAT))
        .unwrap_or_default()
}

/// Full backend URL for `path` (e.g. `/api/rate`) against [`api_base`].
///
/// For library callers without an `AppState`; the handler joins paths onto
/// the base it resolved from its own config.
pub fn api_url(path: &str) -> String {
    build_url(&api_base(), path)
}
