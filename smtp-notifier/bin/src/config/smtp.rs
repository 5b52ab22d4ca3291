use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SmtpConfig {
    /// Applies to connecting and to every SMTP command.
    #[serde(default = "SmtpConfig::default_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl SmtpConfig {
    #[inline]
    pub const fn default_timeout() -> Duration { Duration::from_secs(5) }
}

impl Default for SmtpConfig {
    fn default() -> Self { Self { timeout: Self::default_timeout() } }
}

impl From<SmtpConfig> for smtp_notifier_core::config::SmtpConfig {
    fn from(config: SmtpConfig) -> Self { Self { timeout: config.timeout } }
}
