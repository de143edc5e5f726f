//! Application configuration management.
//!
//! Configuration is read from environment variables (optionally via a `.env`
//! file) and deserialized into a type-safe struct with the `envy` crate.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if one exists; real environment
    /// variables take precedence over values from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or if a variable
    /// cannot be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names map to SCREAMING_SNAKE_CASE variables automatically
        envy::from_env::<Config>()
    }
}
