/// Database configuration and connection management
pub mod database;

/// Seed catalog loading from config.toml
pub mod seed;

/// HTTP server configuration from environment variables
pub mod server;
