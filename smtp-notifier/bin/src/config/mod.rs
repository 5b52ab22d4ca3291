mod error;
mod media;
mod metrics;
mod postgres;
mod smtp;
mod storage;
mod web;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use smtp_notifier_cli_common::config::LogConfig;
use snafu::ResultExt;

pub use self::{
    error::Error, media::MediaConfig, metrics::MetricsConfig, postgres::PostgresConfig,
    smtp::SmtpConfig, storage::StorageConfig, web::WebConfig,
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            smtp_notifier_core::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(smtp_notifier_core::CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        Self::from_yaml(&data, path.as_ref())
    }

    fn from_yaml(data: &str, path: &Path) -> Result<Self, Error> {
        let mut config: Self = serde_yaml::from_str(data)
            .context(error::ParseConfigSnafu { filename: path.to_path_buf() })?;

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        if config.media.max_size == 0 {
            return Err(Error::EmptyMediaSize);
        }
        if let StorageConfig::Postgres(postgres) = &config.storage {
            postgres.validate()?;
        }

        Ok(config)
    }

    pub fn into_server_config(self) -> smtp_notifier_core::config::Config {
        let Self { web, metrics, storage, media, smtp, .. } = self;

        smtp_notifier_core::config::Config {
            web: web.into(),
            metrics: metrics.into(),
            storage: storage.into(),
            media: media.into(),
            smtp: smtp.into(),
        }
    }
}
