//! Server configuration module.
//!
//! Reads the HTTP bind address from the environment with a sensible local
//! default.

/// Gets the socket address the HTTP server binds to.
///
/// Reads `BIND_ADDRESS` from the environment and falls back to
/// `0.0.0.0:8000`.
#[must_use]
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string())
}
