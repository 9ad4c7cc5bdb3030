//! Environment overrides for service credentials.

use crate::schema::FengchaoConfig;
use tracing::debug;

pub const ENV_API_KEY: &str = "FENGCHAO_KEY";
pub const ENV_SECRET_KEY: &str = "FENGCHAO_SECRET";
pub const ENV_BASE_URL: &str = "FENGCHAO_BASE_URL";

/// Overlay `FENGCHAO_KEY`, `FENGCHAO_SECRET` and `FENGCHAO_BASE_URL` onto the
/// `[service]` section. Empty variables are ignored.
pub fn apply_env_overrides(config: &mut FengchaoConfig) {
    apply_with(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_with(config: &mut FengchaoConfig, lookup: impl Fn(&str) -> Option<String>) {
    let service = &mut config.service;
    for (name, slot) in [
        (ENV_API_KEY, &mut service.api_key),
        (ENV_SECRET_KEY, &mut service.secret_key),
        (ENV_BASE_URL, &mut service.base_url),
    ] {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            debug!(var = name, "config value taken from environment");
            *slot = value;
        }
    }
}
