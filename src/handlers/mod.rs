// handlers/mod.rs - two security tiers
//
// public:    no authentication (/health, /login, /pricing)
// protected: user-only gate (/profile, /chat), applied as a route layer in app.rs

pub mod protected;
pub mod public;
