pub mod errors;
pub mod id;

pub use errors::{ConfigError, FengchaoError};
pub use id::{new_correlation_id, new_request_id, RequestId};

pub type Result<T> = std::result::Result<T, FengchaoError>;
