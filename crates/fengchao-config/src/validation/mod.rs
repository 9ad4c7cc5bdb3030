//! Full configuration validation.
//!
//! Validates numeric ranges and the service URL, collecting every problem
//! into a single `ConfigError`.

mod helpers;


use crate::schema::FengchaoConfig;
use fengchao_common::ConfigError;
use helpers::{validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &FengchaoConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let service = &config.service;
    if !service.base_url.is_empty()
        && !service.base_url.starts_with("http://")
        && !service.base_url.starts_with("https://")
    {
        errors.push(format!(
            "service.base_url = {:?} must start with http:// or https://",
            service.base_url
        ));
    }
    validate_range(&mut errors, "service.request_timeout_secs", service.request_timeout_secs, 1, 300);
    validate_range(&mut errors, "service.connect_timeout_secs", service.connect_timeout_secs, 1, 60);
    validate_range(&mut errors, "service.token_ttl_secs", service.token_ttl_secs, 60, 3600);

    let completion = &config.completion;
    if completion.model.trim().is_empty() {
        errors.push("completion.model must not be empty".into());
    }
    validate_range(&mut errors, "completion.max_tokens", u64::from(completion.max_tokens), 1, 32768);
    validate_range(&mut errors, "completion.timeout_secs", completion.timeout_secs, 1, 3600);
    if let Some(temperature) = completion.temperature {
        validate_range_f64(&mut errors, "completion.temperature", temperature, 0.0, 2.0);
    }
    if let Some(top_p) = completion.top_p {
        validate_range_f64(&mut errors, "completion.top_p", top_p, 0.0, 1.0);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Like [`validate`], but also requires the credentials needed to talk to
/// the service.
pub fn validate_for_client(config: &FengchaoConfig) -> Result<(), ConfigError> {
    validate(config)?;
    if config.service.base_url.is_empty() {
        return Err(ConfigError::MissingCredential("service.base_url"));
    }
    if config.service.api_key.is_empty() {
        return Err(ConfigError::MissingCredential("service.api_key"));
    }
    if config.service.secret_key.is_empty() {
        return Err(ConfigError::MissingCredential("service.secret_key"));
    }
    Ok(())
}
