use std::{
    convert::Infallible,
    fmt::{self, Display, Formatter},
    fs::OpenOptions,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    util::TryInitError, Layer,
};

// SAFETY: Configuration file needs many bools.
#[allow(clippy::struct_excessive_bools)]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    #[serde(default = "LogConfig::default_log_filters")]
    pub log_filters: String,

    #[serde(default = "LogConfig::default_log_formatter")]
    #[serde_as(as = "DisplayFromStr")]
    pub formatter: LogFormatter,

    // Display function latency in logs
    #[serde(default = "LogConfig::default_show_fn_latency")]
    pub show_fn_latency: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            log_filters: Self::default_log_filters(),
            formatter: Self::default_log_formatter(),
            show_fn_latency: Self::default_show_fn_latency(),
        }
    }
}

impl LogConfig {
    /// SMTP session chatter from `lettre` and query logs from `sqlx` are noisy
    /// at `info`, keep them at `warn` unless asked otherwise.
    #[inline]
    #[must_use]
    pub fn default_log_filters() -> String { "info,lettre=warn,sqlx=warn".to_string() }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { true }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_log_formatter() -> LogFormatter { LogFormatter::Pretty }

    #[inline]
    #[must_use]
    pub const fn default_show_fn_latency() -> bool { false }

    /// Installs the global `tracing` subscriber described by this
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(&self) -> Result<(), TryInitError> {
        let Self {
            emit_journald,
            file_path,
            emit_stdout,
            emit_stderr,
            log_filters,
            formatter,
            show_fn_latency,
        } = self;

        let filter_layer = tracing_subscriber::filter::EnvFilter::new(log_filters.as_str());

        // Display function latency in logs, for example:
        // `send_notification close, time.busy: 37.5µs, time.idle: 2.01s`.
        let fmt_span = if *show_fn_latency { FmtSpan::CLOSE } else { FmtSpan::NONE };

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(emit_journald.then(|| LogDriver::Journald.layer(fmt_span.clone())))
            .with(file_path.clone().map(|path| LogDriver::File(path, *formatter).layer(fmt_span.clone())))
            .with(emit_stdout.then(|| LogDriver::Stdout(*formatter).layer(fmt_span.clone())))
            .with(emit_stderr.then(|| LogDriver::Stderr(*formatter).layer(fmt_span)))
            .try_init()
    }
}

#[derive(Clone, Debug)]
enum LogDriver {
    Stdout(LogFormatter),
    Stderr(LogFormatter),
    Journald,
    File(PathBuf, LogFormatter),
}

impl LogDriver {
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self, span_events: FmtSpan) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let fmt = tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_target(true)
            .with_span_events(span_events);

        match self {
            Self::Stdout(formatter) => Some(match formatter {
                LogFormatter::Pretty => fmt.with_writer(std::io::stdout).pretty().boxed(),
                LogFormatter::Compact => fmt.with_writer(std::io::stdout).compact().boxed(),
                LogFormatter::Json => {
                    fmt.with_writer(std::io::stdout).json().flatten_event(true).boxed()
                }
            }),
            Self::Stderr(formatter) => Some(match formatter {
                LogFormatter::Pretty => fmt.with_writer(std::io::stderr).pretty().boxed(),
                LogFormatter::Compact => fmt.with_writer(std::io::stderr).compact().boxed(),
                LogFormatter::Json => {
                    fmt.with_writer(std::io::stderr).json().flatten_event(true).boxed()
                }
            }),
            Self::File(path, formatter) => {
                let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                // ANSI escapes are useless in a log file
                let fmt = fmt.with_ansi(false);
                Some(match formatter {
                    LogFormatter::Pretty => fmt.with_writer(file).pretty().boxed(),
                    LogFormatter::Compact => fmt.with_writer(file).compact().boxed(),
                    LogFormatter::Json => fmt.with_writer(file).json().flatten_event(true).boxed(),
                })
            }
            Self::Journald => Some(tracing_journald::layer().ok()?.boxed()),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum LogFormatter {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormatter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Ok(Self::Pretty),
        }
    }
}

impl Display for LogFormatter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_from_str() {
        assert_eq!("json".parse::<LogFormatter>().unwrap(), LogFormatter::Json);
        assert_eq!(" Compact ".parse::<LogFormatter>().unwrap(), LogFormatter::Compact);
        assert_eq!("pretty".parse::<LogFormatter>().unwrap(), LogFormatter::Pretty);
        // unknown values fall back to the human readable formatter
        assert_eq!("xml".parse::<LogFormatter>().unwrap(), LogFormatter::Pretty);
    }

    #[test]
    fn test_formatter_display_round_trips() {
        for formatter in [LogFormatter::Pretty, LogFormatter::Compact, LogFormatter::Json] {
            assert_eq!(formatter.to_string().parse::<LogFormatter>().unwrap(), formatter);
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LogConfig = serde_yaml::from_str("formatter: json\nemit_stderr: true\n").unwrap();

        assert_eq!(config.formatter, LogFormatter::Json);
        assert!(config.emit_stderr);
        assert!(config.emit_stdout);
        assert!(!config.emit_journald);
        assert!(config.file_path.is_none());
        assert_eq!(config.log_filters, LogConfig::default_log_filters());
    }
}
