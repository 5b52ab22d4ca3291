use std::{fmt, net::SocketAddr, path::PathBuf, time::Duration};

use sqlx::postgres::PgSslMode;

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub metrics: MetricsConfig,

    pub storage: StorageConfig,

    pub media: MediaConfig,

    pub smtp: SmtpConfig,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub enable: bool,

    pub listen_address: SocketAddr,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    Memory,

    Postgres(PostgresConfig),
}

impl StorageConfig {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

#[derive(Clone)]
pub struct PostgresConfig {
    pub host: String,

    pub port: u16,

    pub database: String,

    pub username: String,

    pub password: String,

    pub ssl_mode: PgSslMode,

    pub max_connections: u32,

    pub application_name: Option<String>,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("application_name", &self.application_name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// `ffmpeg` executable used to turn non PNG media into a PNG frame.
    pub ffmpeg_path: PathBuf,

    /// Upper bound for downloading media and for running `ffmpeg`.
    pub timeout: Duration,

    /// Largest media resource accepted, in bytes.
    pub max_size: usize,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub timeout: Duration,
}
