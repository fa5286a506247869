//! In-memory user service.
//!
//! - **`users`**: the user resource. Routing, body parsing, validation and
//!   the process-lifetime store.
//! - **`error`**: the closed set of request failures and their HTTP mapping.
//! - **`app`**: router assembly, middleware and the server loop.
//! - **`state`** / **`config`** / **`telemetry`**: process wiring.

pub mod app;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod users;
