mod connector;
pub mod error;
mod media;
mod notifier;
mod sql_executor;
pub mod storage;

pub use self::{
    connector::{smtp_config, MailerConnector, SmtpMailerConnector},
    error::Error,
    media::MediaConverter,
    notifier::NotifierService,
};
