//! FengChao client configuration.
//!
//! TOML-based configuration with environment overrides for credentials and
//! full validation. All sections use defaults so partial configs work.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fengchao_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config.completion.model);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{CompletionConfig, FengchaoConfig, ServiceConfig};
pub use toml_loader::{apply_env_overrides, load_default, load_from_path};

use fengchao_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path (creating a default file if
/// none exists), apply environment overrides, and validate.
pub fn load_config() -> Result<FengchaoConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Same as [`load_config`] but from an explicit path.
pub fn load_config_from(path: &Path) -> Result<FengchaoConfig, ConfigError> {
    let mut config = toml_loader::load_from_path(path)?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}
