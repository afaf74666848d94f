pub mod pricing;
pub mod project;
pub mod user;

pub use pricing::Pricing;
pub use project::{Project, PromptMessage, PromptRole};
pub use user::{NewUser, Role, User};
