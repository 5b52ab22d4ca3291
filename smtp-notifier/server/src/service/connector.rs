use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use notification::{
    smtp::{self, Security},
    NotificationClient,
};
use smtp_notifier_core::model::SmtpSettings;

/// Opens SMTP clients for notifiers.
///
/// Connecting verifies the session, so a returned client has already logged
/// in once.
#[async_trait]
pub trait MailerConnector: Send + Sync {
    async fn connect(
        &self,
        config: &smtp::Config,
    ) -> Result<Arc<dyn NotificationClient>, notification::Error>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SmtpMailerConnector;

#[async_trait]
impl MailerConnector for SmtpMailerConnector {
    async fn connect(
        &self,
        config: &smtp::Config,
    ) -> Result<Arc<dyn NotificationClient>, notification::Error> {
        let client = smtp::Client::connect(config).await?;
        Ok(Arc::new(client))
    }
}

/// Builds the client configuration, `None` while a required setting is
/// missing.
#[must_use]
pub fn smtp_config(settings: &SmtpSettings, timeout: Duration) -> Option<smtp::Config> {
    if !settings.is_complete() {
        return None;
    }

    Some(smtp::Config {
        server: settings.server.clone()?,
        port: settings.port,
        security: Security::from_ssl_enabled(settings.ssl_enabled),
        username: settings.username.clone()?,
        password: settings.password.clone()?,
        from: settings.from_email.clone()?,
        to: settings.to_email.clone()?,
        timeout,
    })
}
