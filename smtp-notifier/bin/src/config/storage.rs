use serde::{Deserialize, Serialize};

use super::PostgresConfig;

/// Where notifiers and their settings are kept.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,

    Postgres(PostgresConfig),
}

impl From<StorageConfig> for smtp_notifier_core::config::StorageConfig {
    fn from(config: StorageConfig) -> Self {
        match config {
            StorageConfig::Memory => Self::Memory,
            StorageConfig::Postgres(postgres) => Self::Postgres(postgres.into()),
        }
    }
}
