use config::{Config, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;

/// Runtime settings. Layered from defaults, an optional `rentals.toml`,
/// `RENTALS_*` environment variables and finally `DATABASE_URL`.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_max_size: u32,
    pub run_migrations: bool,
    pub seed_lookups: bool,
    /// Name of the property class shown on `/api/featured`.
    pub featured_class: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Self::build(Some("rentals"), env::var("DATABASE_URL").ok())
    }

    pub fn build(file: Option<&str>, database_url: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("pool_max_size", 10)?
            .set_default("run_migrations", true)?
            .set_default("seed_lookups", false)?
            .set_default("featured_class", "Featured")?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(Environment::with_prefix("RENTALS").try_parsing(true))
            .set_override_option("database_url", database_url)?
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_defaults_around_database_url() {
        let config = AppConfig::build(None, Some("postgres://localhost/rentals".into())).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/rentals");
        assert_eq!(config.port, 8080);
        assert_eq!(config.pool_max_size, 10);
        assert!(config.run_migrations);
        assert!(!config.seed_lookups);
        assert_eq!(config.featured_class, "Featured");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn requires_database_url() {
        assert!(AppConfig::build(None, None).is_err());
    }
}
