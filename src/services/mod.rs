pub mod llm;
pub mod queue;

pub use llm::{AnthropicClient, LlmClient, LlmError};
pub use queue::{DispatchMessage, MessageQueue, QueueError, SqsQueue};
