//! Configuration schema types for the FengChao client.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod completion;
mod service;

pub use completion::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FengchaoConfig {
    pub service: ServiceConfig,
    pub completion: CompletionConfig,
}
