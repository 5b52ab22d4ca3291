use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use smtp_notifier_server::ApiDoc;
use snafu::ResultExt;
use utoipa::OpenApi;

use crate::{
    command::run_server,
    config::{Config, PostgresConfig, StorageConfig},
    error::{self, Error, Result},
    shadow,
};

#[derive(Debug, Parser)]
#[command(
    name = "smtp-notifier",
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Relay notification events as email through per-notifier SMTP settings",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML configuration file, defaults to the file in the user config
    /// directory.
    #[arg(long = "config", short = 'c', env = "SMTP_NOTIFIER_CONFIG_FILE_PATH", global = true)]
    config_file_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print version and build information
    Version,

    /// Print the completion script of `shell`
    Completion { shell: Shell },

    /// Print a configuration file with every default filled in
    DefaultConfig {
        /// Where the generated configuration keeps notifiers
        #[arg(long, value_enum, default_value = "memory")]
        storage: StorageKind,
    },

    /// Load and validate the configuration, then print what the server
    /// would use
    CheckConfig,

    /// Serve the notifier API until interrupted
    #[command(visible_alias = "run")]
    Server,

    /// Print the OpenAPI document of the notifier API as YAML
    OpenApi,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StorageKind {
    Memory,
    Postgres,
}

impl Cli {
    /// Runs the command, writing everything it prints to `out`.
    pub fn run<W: Write>(self, out: &mut W) -> Result<()> {
        match self.command {
            Command::Version => {
                write_output(out, &Self::command().render_long_version())?;
            }
            Command::Completion { shell } => {
                let mut command = Self::command();
                let bin_name = command.get_name().to_string();
                clap_complete::generate(shell, &mut command, bin_name, out);
            }
            Command::DefaultConfig { storage } => {
                let storage = match storage {
                    StorageKind::Memory => StorageConfig::Memory,
                    StorageKind::Postgres => StorageConfig::Postgres(PostgresConfig::default()),
                };
                let config = Config { storage, ..Config::default() };
                let text = serde_yaml::to_string(&config).context(error::SerializeConfigSnafu)?;
                write_output(out, &text)?;
            }
            Command::CheckConfig => {
                let (path, config) = self.load_config()?;
                write_output(out, &summarize(&path, &config))?;
            }
            Command::Server => {
                let (_path, config) = self.load_config()?;
                run_server(config)?;
            }
            Command::OpenApi => {
                let document = ApiDoc::openapi()
                    .to_yaml()
                    .map_err(|err| Error::RenderOpenApi { message: err.to_string() })?;
                write_output(out, &document)?;
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<(PathBuf, Config)> {
        let path = self.config_file_path.clone().unwrap_or_else(Config::default_path);
        let config = Config::load(&path)?;
        Ok((path, config))
    }
}

fn write_output<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).context(error::WriteOutputSnafu)
}

fn summarize(path: &std::path::Path, config: &Config) -> String {
    let storage = match &config.storage {
        StorageConfig::Memory => "memory, notifiers are lost on restart".to_string(),
        StorageConfig::Postgres(postgres) => format!(
            "postgres {}@{}:{}/{}",
            postgres.username, postgres.host, postgres.port, postgres.database
        ),
    };
    let metrics = if config.metrics.enable {
        config.metrics.socket_address().to_string()
    } else {
        "disabled".to_string()
    };

    format!(
        "config: {}\nweb: {}\nmetrics: {metrics}\nstorage: {storage}\nmedia: `{}`, at most {} \
         bytes, {}s timeout\nsmtp: {}s timeout\n",
        path.display(),
        config.web.socket_address(),
        config.media.ffmpeg_path.display(),
        config.media.max_size,
        config.media.timeout.as_secs(),
        config.smtp.timeout.as_secs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> (Result<()>, String) {
        let cli = Cli::try_parse_from(std::iter::once("smtp-notifier").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let result = cli.run(&mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_definition() { Cli::command().debug_assert(); }

    #[test]
    fn test_run_is_alias_of_server() {
        let cli = Cli::try_parse_from(["smtp-notifier", "run", "-c", "notifier.yaml"]).unwrap();

        assert!(matches!(cli.command, Command::Server));
        assert_eq!(cli.config_file_path, Some(PathBuf::from("notifier.yaml")));
    }

    #[test]
    fn test_default_config_with_postgres() {
        let (result, text) = run(&["default-config", "--storage", "postgres"]);
        assert!(result.is_ok());

        let config: Config = serde_yaml::from_str(&text).unwrap();
        let StorageConfig::Postgres(postgres) = config.storage else {
            panic!("expected postgres storage in:\n{text}");
        };
        assert_eq!(postgres.database, "smtp_notifier");
    }

    #[test]
    fn test_check_config() {
        let path = std::env::temp_dir()
            .join(format!("smtp-notifier-check-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "web:\n  port: 8080\nstorage:\n  type: postgres\n  host: db.internal\n")
            .unwrap();

        let (result, text) = run(&["check-config", "--config", path.to_str().unwrap()]);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
        assert!(text.contains(":8080\n"), "{text}");
        assert!(text.contains("storage: postgres smtp_notifier@db.internal:5432/smtp_notifier"));
        assert!(text.contains("metrics: disabled"));
    }

    #[test]
    fn test_check_config_missing_file() {
        let (result, text) = run(&["check-config", "-c", "/nonexistent/smtp-notifier.yaml"]);

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(error::CommandError::exit_code(&err), exitcode::CONFIG);
        assert!(text.is_empty());
    }

    #[test]
    fn test_openapi_document() {
        let (result, text) = run(&["open-api"]);

        assert!(result.is_ok());
        assert!(text.contains("/api/v1/notifiers/{id}/notifications"));
    }
}
