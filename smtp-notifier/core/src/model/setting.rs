use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Shown instead of a stored password.
pub const REDACTED_PASSWORD: &str = "********";

/// Port used when none is stored, SMTP submission over implicit TLS.
const DEFAULT_PORT: u16 = 465;

/// Keys of the settings a notifier understands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SettingKey {
    Server,
    Port,
    SslEnabled,
    Username,
    Password,
    FromEmail,
    ToEmail,
}

impl SettingKey {
    /// In the order the settings are presented.
    pub const ALL: [Self; 7] = [
        Self::Server,
        Self::Port,
        Self::SslEnabled,
        Self::Username,
        Self::Password,
        Self::FromEmail,
        Self::ToEmail,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Port => "port",
            Self::SslEnabled => "ssl_enabled",
            Self::Username => "username",
            Self::Password => "password",
            Self::FromEmail => "from_email",
            Self::ToEmail => "to_email",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Server => "SMTP Server",
            Self::Port => "SMTP Port",
            Self::SslEnabled => "SMTP SSL",
            Self::Username => "SMTP Username",
            Self::Password => "SMTP Password",
            Self::FromEmail => "From Email",
            Self::ToEmail => "To Email",
        }
    }

    #[must_use]
    pub const fn description(self) -> Option<&'static str> {
        match self {
            Self::SslEnabled => Some(
                "Require SSL when connecting to the SMTP server. If unset, will attempt to use \
                 STARTTLS.",
            ),
            _ => None,
        }
    }

    #[must_use]
    pub const fn setting_type(self) -> SettingType {
        match self {
            Self::Port => SettingType::Number,
            Self::SslEnabled => SettingType::Boolean,
            Self::Password => SettingType::Password,
            Self::Server | Self::Username | Self::FromEmail | Self::ToEmail => SettingType::String,
        }
    }

    /// Validates a submitted value and returns what is stored for it.
    ///
    /// `null` clears the setting, which brings back the default for `port`
    /// and `ssl_enabled`.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is not an integer in `0..=65535` or the
    /// value is an array or an object.
    pub fn normalize(self, value: &serde_json::Value) -> Result<Option<String>> {
        use serde_json::Value;

        let text = match value {
            Value::Null => return Ok(None),
            Value::String(text) => text.clone(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::UnsupportedSettingValue { key: self.to_string() })
            }
        };

        match self {
            Self::Port => {
                let port = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::PortNotNumber { value: text.clone() })?;
                if !(0..=i64::from(u16::MAX)).contains(&port) {
                    return Err(Error::PortOutOfRange { value: port });
                }
                Ok(Some(port.to_string()))
            }
            Self::SslEnabled => Ok(Some((text == "true").to_string())),
            _ => Ok(Some(text)),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnknownSettingKey { key: s.to_string() })
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    String,
    Number,
    Boolean,
    Password,
}

/// A setting as presented to whoever configures a notifier.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct Setting {
    pub title: String,

    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<SettingType>,
}

/// Typed view over the stored settings of one notifier.
#[derive(Clone, Eq, PartialEq)]
pub struct SmtpSettings {
    pub server: Option<String>,
    pub port: u16,
    pub ssl_enabled: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            server: None,
            port: DEFAULT_PORT,
            ssl_enabled: true,
            username: None,
            password: None,
            from_email: None,
            to_email: None,
        }
    }
}

impl SmtpSettings {
    #[must_use]
    pub fn from_stored(stored: &HashMap<String, String>) -> Self {
        let text = move |key: SettingKey| {
            stored.get(key.as_str()).map(|value| value.trim()).filter(|value| !value.is_empty())
        };

        let port = match text(SettingKey::Port).map(str::parse::<u16>) {
            None => DEFAULT_PORT,
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                tracing::warn!("Ignoring stored SMTP port that is not a number");
                DEFAULT_PORT
            }
        };

        Self {
            server: text(SettingKey::Server).map(str::to_string),
            port,
            ssl_enabled: text(SettingKey::SslEnabled).is_none_or(|value| value == "true"),
            username: text(SettingKey::Username).map(str::to_string),
            password: text(SettingKey::Password).map(str::to_string),
            from_email: text(SettingKey::FromEmail).map(str::to_string),
            to_email: text(SettingKey::ToEmail).map(str::to_string),
        }
    }

    /// Whether every value needed to open an SMTP session is present.
    ///
    /// Port `0` counts as missing.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.server.is_some()
            && self.port != 0
            && self.username.is_some()
            && self.password.is_some()
            && self.from_email.is_some()
            && self.to_email.is_some()
    }

    /// Settings in presentation order, the password is redacted.
    #[must_use]
    pub fn to_settings(&self) -> Vec<Setting> {
        SettingKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    SettingKey::Server => self.server.clone().map(serde_json::Value::from),
                    SettingKey::Port => Some(serde_json::Value::from(self.port)),
                    SettingKey::SslEnabled => Some(serde_json::Value::from(self.ssl_enabled)),
                    SettingKey::Username => self.username.clone().map(serde_json::Value::from),
                    SettingKey::Password => {
                        self.password.as_ref().map(|_| serde_json::Value::from(REDACTED_PASSWORD))
                    }
                    SettingKey::FromEmail => self.from_email.clone().map(serde_json::Value::from),
                    SettingKey::ToEmail => self.to_email.clone().map(serde_json::Value::from),
                };

                Setting {
                    title: key.title().to_string(),
                    key: key.as_str().to_string(),
                    value,
                    description: key.description().map(str::to_string),
                    type_: Some(key.setting_type()),
                }
            })
            .collect()
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("ssl_enabled", &self.ssl_enabled)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED_PASSWORD))
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .finish()
    }
}
