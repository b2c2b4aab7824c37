//! Model gateway adapters.
//!
//! [`OpenAiGateway`] speaks the OpenAI chat completions protocol; all of its
//! requests go through [`with_retry`](retry::with_retry).

pub mod openai;
pub mod retry;

pub use openai::OpenAiGateway;
pub use retry::RetryConfig;
