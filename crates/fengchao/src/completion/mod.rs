//! Chat completion: request options, results and the endpoints.

mod api;
pub mod options;
pub mod result;

pub use options::{CompletionOptions, Mode};
pub use result::{
    chat_completion_error_handler, ChatCompletionError, ChatCompletionErrorDetail,
    ChatCompletionResult, Choice, Usage,
};
