use snafu::Snafu;
use tracing_subscriber::util::TryInitError;

use crate::config;

/// Result type alias for the CLI.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for the CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Application { source: smtp_notifier_server::Error },

    #[snafu(display("Could not initialize tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: tokio::io::Error },

    #[snafu(display("Could not initialize logger, error: {source}"))]
    InitializeLogger { source: TryInitError },

    #[snafu(display("{source}"))]
    Config { source: config::Error },

    #[snafu(display("Could not serialize config, error: {source}"))]
    SerializeConfig { source: serde_yaml::Error },

    #[snafu(display("Could not render OpenAPI document, error: {message}"))]
    RenderOpenApi { message: String },

    #[snafu(display("Could not write to standard output, error: {source}"))]
    WriteOutput { source: std::io::Error },
}

impl From<config::Error> for Error {
    fn from(source: config::Error) -> Self { Self::Config { source } }
}

impl From<smtp_notifier_server::Error> for Error {
    fn from(source: smtp_notifier_server::Error) -> Self { Self::Application { source } }
}

pub trait CommandError {
    fn exit_code(&self) -> exitcode::ExitCode;
}

impl CommandError for Error {
    fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Application { .. }
            | Self::SerializeConfig { .. }
            | Self::RenderOpenApi { .. } => exitcode::SOFTWARE,
            Self::Config { .. } | Self::InitializeLogger { .. } => exitcode::CONFIG,
            Self::InitializeTokioRuntime { .. } | Self::WriteOutput { .. } => exitcode::IOERR,
        }
    }
}
