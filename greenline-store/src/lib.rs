pub mod app_config;
pub mod catalog_source;

pub use app_config::{BusinessRules, Config};
pub use catalog_source::{load_seed_file, seed_catalog, SeedError};
