pub mod config;
pub mod error;
pub mod model;

use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::LazyLock,
};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROJECT_NAME: &str = "smtp-notifier";
pub const PROJECT_NAME_WITH_INITIAL_CAPITAL: &str = "SMTP Notifier";

pub const PROGRAM_NAME: &str = "smtp-notifier";
pub const CONFIG_NAME: &str = "smtp-notifier.yaml";

pub const DEFAULT_WEB_PORT: u16 = 14444;
pub const DEFAULT_WEB_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub const DEFAULT_METRICS_PORT: u16 = 14446;
pub const DEFAULT_METRICS_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Name given to notifiers created without one.
pub const DEFAULT_NOTIFIER_NAME: &str = "New SMTP Notifier";

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .expect("Creating `ProjectDirs` should always success")
        .config_dir()
        .to_path_buf()
});

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub branch: String,
    pub commit_hash: String,
    /// Where notifier settings are kept, `memory` or `postgres`.
    pub storage: String,
    pub start_time: DateTime<Utc>,
}
