//! API utilities for frontend-backend communication
//!
//! The dashboard is served from the same origin as its API, so URLs are built
//! from `window.location.origin`.

/// Get the base URL for API requests
///
/// # Returns
/// - Origin like "http://localhost:8088"
/// - Empty string if window is not available (relative URLs still work)
pub fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/api/explore_json/?force=true");
/// ```
pub fn api_url(path: &str) -> String {
    join_url(&api_base(), path)
}

/// Joins a base and a path without doubling or dropping the `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
