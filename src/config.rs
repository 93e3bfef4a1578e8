//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, ValidatorConfig};
#[cfg(feature = "report")]
use crate::report::ReportConfig;

/// Configuration for [`Engine`](crate::Engine). Every section falls back to
/// its defaults when omitted.
///
/// ```json
/// {
///   "validation": { "vat_rates": ["0.21", "0.09", "0.05", "0"], "max_future_months": 2 },
///   "report": { "company_order": "case_insensitive" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidatorConfig,
    #[cfg(feature = "report")]
    pub report: ReportConfig,
}

impl EngineConfig {
    /// Check the configuration for values that would disable the checks.
    pub fn check(&self) -> Result<(), EngineError> {
        self.validation.check()?;
        #[cfg(feature = "report")]
        {
            if self.report.unknown_company_label.trim().is_empty() {
                return Err(EngineError::Config(
                    "unknown company label must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Parse and check a JSON configuration.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Read, parse and check a JSON configuration file.
    #[cfg(feature = "json")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
