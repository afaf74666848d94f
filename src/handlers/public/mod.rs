// handlers/public/mod.rs - endpoints that need no bearer token

pub mod health;
pub mod login;
pub mod pricing;

pub use health::health_get;
pub use login::login_post;
pub use pricing::pricing_get;
