use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not open config from {}, error: {source}", filename.display()))]
    OpenConfig { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Count not parse config from {}, error: {source}", filename.display()))]
    ParseConfig { filename: PathBuf, source: serde_yaml::Error },

    #[snafu(display("Could not resolve file path {}, error: {source}", file_path.display()))]
    ResolveFilePath { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("`media.max_size` must be greater than zero"))]
    EmptyMediaSize,

    #[snafu(display("`storage.{field}` must not be empty for postgres storage"))]
    EmptyPostgresField { field: &'static str },

    #[snafu(display("`storage.max_connections` must be greater than zero"))]
    NoPostgresConnection,
}
