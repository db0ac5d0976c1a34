//! Configuration module
//!
//! Environment-driven settings for the data-access layer and the license cache.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const LICENSE_CACHE_TTL_SECS: u64 = 60;
const LICENSE_CACHE_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct LicensingConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// How long a fetched license row is reused before refetching. 0 disables caching.
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl LicensingConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_var("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            cache_ttl_secs: parse_var("LICENSE_CACHE_TTL_SECS", LICENSE_CACHE_TTL_SECS)?,
            cache_capacity: parse_var("LICENSE_CACHE_CAPACITY", LICENSE_CACHE_CAPACITY)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Defaults for tests and offline use; no database.
    pub fn offline() -> Self {
        Self {
            database_url: String::new(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            cache_ttl_secs: LICENSE_CACHE_TTL_SECS,
            cache_capacity: LICENSE_CACHE_CAPACITY,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        if self.cache_capacity == 0 {
            return Err(anyhow::anyhow!("LICENSE_CACHE_CAPACITY must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| {
            anyhow::anyhow!("Invalid {} value '{}': expected a number", name, value)
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_postgres_url() {
        let mut config = LicensingConfig::offline();
        config.database_url = "mysql://localhost/licensing".to_string();
        assert!(config.validate().is_err());

        config.database_url = "postgres://localhost/licensing".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = LicensingConfig::offline();
        config.database_url = "postgresql://localhost/licensing".to_string();
        config.cache_capacity = 0;
        assert!(config.validate().is_err());
    }
}
