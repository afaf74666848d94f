// handlers/protected/mod.rs - endpoints behind the role gates
//
// Every handler here can rely on an `AuthUser` in the request extensions;
// the gate in front of the route group put it there.

pub mod chat;
pub mod profile;

pub use chat::chat_post;
pub use profile::profile_get;
