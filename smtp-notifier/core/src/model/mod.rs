// models shared by the HTTP API and the notifier service

mod setting;

pub use self::setting::{Setting, SettingKey, SettingType, SmtpSettings, REDACTED_PASSWORD};
