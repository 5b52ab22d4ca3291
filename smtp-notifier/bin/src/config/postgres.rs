use serde::{Deserialize, Serialize};
use sqlx::postgres::PgSslMode;

use super::Error;

/// Connection to the database holding notifiers and their SMTP settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,

    pub port: u16,

    pub database: String,

    pub username: String,

    pub password: String,

    pub ssl_mode: SslMode,

    pub max_connections: u32,

    /// Shown in `pg_stat_activity`, empty to leave it unset.
    pub application_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5432,
            database: "smtp_notifier".to_string(),
            username: "smtp_notifier".to_string(),
            password: String::new(),
            ssl_mode: SslMode::Prefer,
            // deliveries hold a connection only while settings are read
            max_connections: 4,
            application_name: smtp_notifier_core::PROGRAM_NAME.to_string(),
        }
    }
}

impl PostgresConfig {
    /// # Errors
    ///
    /// Returns an error if a field needed to reach the database is empty or
    /// the pool may not open any connection.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in
            [("host", &self.host), ("database", &self.database), ("username", &self.username)]
        {
            if value.trim().is_empty() {
                return Err(Error::EmptyPostgresField { field });
            }
        }

        if self.max_connections == 0 {
            return Err(Error::NoPostgresConnection);
        }

        Ok(())
    }
}

impl From<PostgresConfig> for smtp_notifier_core::config::PostgresConfig {
    fn from(config: PostgresConfig) -> Self {
        let application_name =
            Some(config.application_name).filter(|name| !name.trim().is_empty());

        Self {
            host: config.host,
            port: config.port,
            database: config.database,
            username: config.username,
            password: config.password,
            ssl_mode: config.ssl_mode.into(),
            max_connections: config.max_connections,
            application_name,
        }
    }
}

/// `sslmode` of libpq, spelled the same way.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => Self::Disable,
            SslMode::Allow => Self::Allow,
            SslMode::Prefer => Self::Prefer,
            SslMode::Require => Self::Require,
            SslMode::VerifyCa => Self::VerifyCa,
            SslMode::VerifyFull => Self::VerifyFull,
        }
    }
}
