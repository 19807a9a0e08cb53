// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

// === ERROR CATALOG ===
pub mod errors;

// === MODULE DEFINITION ===
pub mod config;
pub mod module;
pub use config::UsersConfig;
pub use module::UsersModule;

pub use api::rest::auth::{actor_from_body, AuthGate, AuthenticatedUser};

// === INTERNAL MODULES ===
// Exposed for tests; other modules should stick to `contract` and `AuthGate`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
