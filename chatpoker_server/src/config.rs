//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chatpoker::{
    ledger::LedgerConfig,
    table::{OptionsError, TableOptions},
};
use std::{fmt::Display, str::FromStr};

/// Complete server configuration, CLI flags taking precedence over the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Number of tables to open on startup
    pub tables: usize,
    /// Bots seated at each table
    pub bots_per_table: usize,
    /// Hands each table plays before shutting down
    pub hands_per_table: u64,
    /// Options every table is created with
    pub table_options: TableOptions,
    /// Free chips and table limits
    pub ledger: LedgerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `tables_override` - Optional table count (from CLI args)
    /// * `bots_override` - Optional bots per table (from CLI args)
    /// * `hands_override` - Optional hands per table (from CLI args)
    /// * `options_override` - Optional table options in wire form (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but malformed
    pub fn from_env(
        tables_override: Option<usize>,
        bots_override: Option<usize>,
        hands_override: Option<u64>,
        options_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let tables = match tables_override {
            Some(tables) => tables,
            None => parse_env_or("TABLES", 1)?,
        };
        let bots_per_table = match bots_override {
            Some(bots) => bots,
            None => parse_env_or("BOTS_PER_TABLE", 4)?,
        };
        let hands_per_table = match hands_override {
            Some(hands) => hands,
            None => parse_env_or("HANDS_PER_TABLE", 100)?,
        };
        let table_options = match options_override.or_else(|| std::env::var("TABLE_OPTIONS").ok()) {
            Some(raw) => raw.parse()?,
            None => TableOptions::default(),
        };

        let config = Self {
            tables,
            bots_per_table,
            hands_per_table,
            table_options,
            ledger: LedgerConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table_options.validate()?;

        if self.tables == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.tables > self.ledger.max_tables_per_owner {
            return Err(ConfigError::Invalid {
                var: "TABLES".to_string(),
                reason: format!(
                    "Cannot exceed MAX_TABLES_PER_OWNER ({})",
                    self.ledger.max_tables_per_owner
                ),
            });
        }

        if self.bots_per_table < 2 {
            return Err(ConfigError::Invalid {
                var: "BOTS_PER_TABLE".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.bots_per_table > self.table_options.seats {
            return Err(ConfigError::Invalid {
                var: "BOTS_PER_TABLE".to_string(),
                reason: format!(
                    "Cannot exceed the table's seats ({})",
                    self.table_options.seats
                ),
            });
        }

        let buy_in = self.table_options.min_buy_in_chips();
        if self.ledger.free_chips < buy_in {
            return Err(ConfigError::Invalid {
                var: "FREE_CHIPS".to_string(),
                reason: format!("Must cover the minimum buy-in ({buy_in})"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Invalid table options: {0}")]
    Options(#[from] OptionsError),
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        var: key.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            tables: 2,
            bots_per_table: 4,
            hands_per_table: 10,
            table_options: TableOptions::default(),
            ledger: LedgerConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let err = parse_value::<usize>("TABLES", "two").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("TABLES"));
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(parse_value::<u64>("HANDS_PER_TABLE", " 25 ").unwrap(), 25);
    }

    #[test]
    fn test_config_validation_too_many_bots() {
        let config = ServerConfig {
            bots_per_table: 7,
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "BOTS_PER_TABLE"));
    }

    #[test]
    fn test_config_validation_no_tables() {
        let config = ServerConfig {
            tables: 0,
            ..config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_validation_table_limit() {
        let config = ServerConfig {
            tables: 4,
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLES"));
    }

    #[test]
    fn test_config_validation_bad_options() {
        let mut config = config();
        config.table_options.seats = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Options(_))));
    }

    #[test]
    fn test_config_validation_free_chips_cover_buy_in() {
        let mut config = config();
        config.ledger.free_chips = 10;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "FREE_CHIPS"));
    }
}
