use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MediaConfig {
    /// Looked up in `PATH` unless absolute.
    #[serde(default = "MediaConfig::default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "MediaConfig::default_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,

    /// In bytes.
    #[serde(default = "MediaConfig::default_max_size")]
    pub max_size: usize,
}

impl MediaConfig {
    #[inline]
    pub fn default_ffmpeg_path() -> PathBuf { PathBuf::from("ffmpeg") }

    #[inline]
    pub const fn default_timeout() -> Duration { Duration::from_secs(30) }

    #[inline]
    pub const fn default_max_size() -> usize { 20 * 1024 * 1024 }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: Self::default_ffmpeg_path(),
            timeout: Self::default_timeout(),
            max_size: Self::default_max_size(),
        }
    }
}

impl From<MediaConfig> for smtp_notifier_core::config::MediaConfig {
    fn from(MediaConfig { ffmpeg_path, timeout, max_size }: MediaConfig) -> Self {
        Self { ffmpeg_path, timeout, max_size }
    }
}
