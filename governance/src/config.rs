//! Engine configuration with TOML file support.

use crate::error::GovernanceError;
use crate::params::{GovernanceParams, DEFAULT_QUORUM_PCT, DEFAULT_VOTING_PERIOD};
use scholar_types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a governance deployment.
///
/// Loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or built
/// programmatically with [`GovernanceConfig::new`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Bootstrap admin; also the first registered voter.
    pub admin: Address,

    /// Voting window length in ticks.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    /// Quorum as a percentage of registered voters.
    #[serde(default = "default_quorum_pct")]
    pub quorum_pct: u8,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_voting_period() -> u64 {
    DEFAULT_VOTING_PERIOD
}

fn default_quorum_pct() -> u8 {
    DEFAULT_QUORUM_PCT
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GovernanceConfig {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            voting_period: default_voting_period(),
            quorum_pct: default_quorum_pct(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GovernanceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.params().validate()?;
        if config.admin.is_zero() {
            return Err(GovernanceError::Config("admin must not be the zero address".into()));
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn params(&self) -> GovernanceParams {
        GovernanceParams {
            voting_period: self.voting_period,
            quorum_pct: self.quorum_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ADMIN: &str = "0x00000000000000000000000000000000000000a1";

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = GovernanceConfig::new(ADMIN.parse().unwrap());
        let toml_str = config.to_toml_string().unwrap();
        let parsed = GovernanceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.admin, config.admin);
        assert_eq!(parsed.params(), GovernanceParams::default());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = GovernanceConfig::from_toml_str(&format!("admin = \"{ADMIN}\"")).unwrap();
        assert_eq!(config.voting_period, DEFAULT_VOTING_PERIOD);
        assert_eq!(config.quorum_pct, 30);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = format!(
            r#"
            admin = "{ADMIN}"
            voting_period = 12
            quorum_pct = 51
            log_format = "json"
        "#
        );
        let config = GovernanceConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.params().voting_period, 12);
        assert_eq!(config.params().quorum_pct, 51);
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn missing_admin_is_a_config_error() {
        let err = GovernanceConfig::from_toml_str("").unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let over = format!("admin = \"{ADMIN}\"\nquorum_pct = 150");
        assert!(GovernanceConfig::from_toml_str(&over).is_err());
        let zero = format!("admin = \"{ADMIN}\"\nvoting_period = 0");
        assert!(GovernanceConfig::from_toml_str(&zero).is_err());
        let zero_admin = "admin = \"0x0000000000000000000000000000000000000000\"";
        assert!(GovernanceConfig::from_toml_str(zero_admin).is_err());
        assert!(GovernanceConfig::from_toml_str("admin = \"0x12\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "admin = \"{ADMIN}\"\nvoting_period = 40").unwrap();
        let config = GovernanceConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.voting_period, 40);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = GovernanceConfig::from_toml_file("/nonexistent/governance.toml").unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }
}
