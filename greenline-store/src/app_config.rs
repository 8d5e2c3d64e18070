use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Path to the operator-managed trip dataset (JSON).
    pub seed_path: String,
}

/// Tunable reservation policy. Lives in config rather than code so
/// operations can adjust hold windows without a deploy.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub default_hold_seconds: i64,
    #[serde(default = "default_min_hold")]
    pub min_hold_seconds: i64,
    pub max_hold_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub max_seats_per_reservation: usize,
}

fn default_min_hold() -> i64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of GREENLINE)
            .add_source(config::Environment::with_prefix("GREENLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
