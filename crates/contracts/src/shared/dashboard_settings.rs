use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Tunables for dashboard grid cells.
///
/// Every field has a default so a partial source (query string, JSON blob)
/// only needs to carry the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Quiet period before a width/height change is applied to a chart cell.
    pub resize_debounce_ms: u32,
    /// Header height used while the header element has not been measured yet.
    pub header_fallback_height: f64,
    /// Query timeout passed to refresh requests, in seconds.
    pub default_timeout_secs: u32,
    /// Prefix for explore and explore_json endpoints.
    pub api_prefix: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 350,
            header_fallback_height: 30.0,
            default_timeout_secs: 60,
            api_prefix: "/api".to_string(),
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<()> {
        if self.header_fallback_height < 0.0 || !self.header_fallback_height.is_finite() {
            bail!(
                "header_fallback_height must be a non-negative number, got {}",
                self.header_fallback_height
            );
        }
        if self.default_timeout_secs == 0 {
            bail!("default_timeout_secs must be greater than zero");
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            bail!("api_prefix must start with '/', got '{}'", self.api_prefix);
        }
        Ok(())
    }
}
