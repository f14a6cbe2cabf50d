//! Engine configuration management.

use serde::Deserialize;

use crate::error::SharedResult;

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Name of the default chart of accounts.
    #[serde(default = "default_chart")]
    pub default_chart: String,
    /// Whether to log layer-grouped transaction movements (debug aid).
    #[serde(default)]
    pub print_movements: bool,
    /// Maximum number of entries accepted in a single creation request.
    #[serde(default = "default_max_entries")]
    pub max_entries_per_request: usize,
}

fn default_chart() -> String {
    "main".to_string()
}

fn default_max_entries() -> usize {
    64
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_chart: default_chart(),
            print_movements: false,
            max_entries_per_request: default_max_entries(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> SharedResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STRATA").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.default_chart, "main");
        assert!(!config.print_movements);
        assert_eq!(config.max_entries_per_request, 64);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let config = EngineConfig::load().unwrap();
        assert_eq!(config.ledger.default_chart, "main");
        assert!(!config.ledger.print_movements);
    }
}
