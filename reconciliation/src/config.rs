//! Configuration for the reconciliation engine

use crate::tolerance::DEFAULT_TOLERANCE_PCT;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reconciliation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Service name
    pub service_name: String,

    /// Tolerance applied when a trigger does not name its own threshold
    pub default_tolerance_pct: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "reconciliation-engine".to_string(),
            default_tolerance_pct: DEFAULT_TOLERANCE_PCT,
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_round_trip() {
        let path = std::env::temp_dir().join(format!("recon-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "service_name = \"recon-test\"\ndefault_tolerance_pct = \"0.75\"\n",
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.service_name, "recon-test");
        assert_eq!(config.default_tolerance_pct, Decimal::new(75, 2));
    }

    #[test]
    fn test_from_file_reports_parse_failures() {
        let path = std::env::temp_dir().join(format!("recon-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "default_tolerance_pct = [").unwrap();

        let result = EngineConfig::from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
