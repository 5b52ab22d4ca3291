use std::process;

use chrono::Utc;
use smtp_notifier_core::{ServerInfo, PROGRAM_NAME};
use snafu::ResultExt;
use tokio::runtime::Runtime;

use crate::{
    config::Config,
    error,
    error::{Error, Result},
    shadow::{BRANCH, PKG_VERSION, SHORT_COMMIT},
};

/// Run the server
#[allow(clippy::cognitive_complexity)]
pub fn run_server(config: Config) -> Result<()> {
    config.log.init().context(error::InitializeLoggerSnafu)?;

    let config = config.into_server_config();

    let server_info = ServerInfo {
        version: PKG_VERSION.to_string(),
        branch: BRANCH.to_string(),
        commit_hash: SHORT_COMMIT.to_string(),
        storage: config.storage.kind().to_string(),
        start_time: Utc::now(),
    };

    tracing::info!("{PROGRAM_NAME} is initializing, pid: {}", process::id());
    tracing::info!("Server info: {server_info:?}");

    tracing::info!("Initializing Tokio runtime");

    let exit_status = match Runtime::new().context(error::InitializeTokioRuntimeSnafu) {
        Ok(runtime) => runtime.block_on(async move {
            smtp_notifier_server::serve_with_shutdown(config, server_info)
                .await
                .map_err(Error::from)
        }),

        Err(err) => Err(err),
    };

    if let Err(ref error) = exit_status {
        tracing::error!(%error);
    }

    tracing::info!("{PROGRAM_NAME} is shutdown");
    exit_status
}
