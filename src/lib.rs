pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

pub use app::{app, router, AppState, ChatSettings};
pub use error::ApiError;
