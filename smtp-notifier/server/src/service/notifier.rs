use std::{collections::HashMap, sync::Arc, time::Duration};

use notification::{Attachment, Notification, NotificationClient};
use smtp_notifier_core::{
    model::{Setting, SettingKey, SmtpSettings, REDACTED_PASSWORD},
    DEFAULT_NOTIFIER_NAME,
};
use smtp_notifier_metrics::NotificationMetrics;
use snafu::ResultExt;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{
    connector::{smtp_config, MailerConnector},
    error::{self, Error, Result},
    media::MediaConverter,
    storage::NotifierStore,
};
use crate::entity::{Notifier, SendNotificationRequest, SendNotificationResponse};

/// An initialized SMTP client and the recipients it delivers to.
struct Mailer {
    client: Arc<dyn NotificationClient>,
    recipients: String,
}

struct NotifierDevice {
    info: Notifier,
    // held while the client is rebuilt from settings
    initializing: Mutex<()>,
}

/// Lifecycle, settings and delivery of notifiers.
#[derive(Clone)]
pub struct NotifierService {
    store: Arc<dyn NotifierStore>,
    connector: Arc<dyn MailerConnector>,
    media: MediaConverter,
    metrics: NotificationMetrics,
    smtp_timeout: Duration,
    devices: Arc<RwLock<HashMap<Uuid, Arc<NotifierDevice>>>>,
}

impl NotifierService {
    #[must_use]
    pub fn new(
        store: Arc<dyn NotifierStore>,
        connector: Arc<dyn MailerConnector>,
        media: MediaConverter,
        metrics: NotificationMetrics,
        smtp_timeout: Duration,
    ) -> Self {
        Self {
            store,
            connector,
            media,
            metrics,
            smtp_timeout,
            devices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Largest media accepted by the converter, in bytes.
    #[must_use]
    pub const fn max_media_size(&self) -> usize { self.media.max_size() }

    /// Settings asked for when a notifier is created.
    #[must_use]
    pub fn creation_settings() -> Vec<Setting> {
        vec![Setting {
            title: "Name".to_string(),
            key: "name".to_string(),
            value: None,
            description: None,
            type_: None,
        }]
    }

    /// # Errors
    ///
    /// Returns an error if the notifier can not be stored.
    pub async fn create_notifier(&self, name: Option<&str>) -> Result<Notifier> {
        let name = name.map(str::trim).filter(|name| !name.is_empty()).unwrap_or(DEFAULT_NOTIFIER_NAME);

        let notifier = self.store.insert_notifier(Uuid::new_v4(), name).await?;
        tracing::info!(notifier = %notifier.name, id = %notifier.id, "Notifier created");

        let _previous =
            self.devices.write().await.insert(notifier.id, Arc::new(NotifierDevice::new(&notifier)));
        Ok(notifier)
    }

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    pub async fn list_notifiers(&self) -> Result<Vec<Notifier>> { self.store.list_notifiers().await }

    /// # Errors
    ///
    /// Returns an error if the notifier does not exist.
    pub async fn get_notifier(&self, id: Uuid) -> Result<Notifier> {
        Ok(self.device(id).await?.info.clone())
    }

    /// Forgets the notifier and its settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the notifier does not exist.
    pub async fn release_notifier(&self, id: Uuid) -> Result<()> {
        let cached = self.devices.write().await.remove(&id);

        if self.store.delete_notifier(id).await? || cached.is_some() {
            tracing::info!(%id, "Notifier released");
            Ok(())
        } else {
            Err(Error::NotifierNotFound { id })
        }
    }

    /// # Errors
    ///
    /// Returns an error if the notifier does not exist.
    pub async fn get_settings(&self, id: Uuid) -> Result<Vec<Setting>> {
        let _device = self.device(id).await?;
        Ok(self.smtp_settings(id).await?.to_settings())
    }

    /// Validates and stores one setting, then re-initializes the SMTP client.
    ///
    /// A client that can not be initialized is logged, the setting is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value is invalid or the
    /// notifier does not exist.
    pub async fn put_setting(
        &self,
        id: Uuid,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Setting>> {
        let key: SettingKey = key.parse()?;
        let value = key.normalize(value)?;
        let device = self.device(id).await?;

        // the redacted password read back from `get_settings` keeps the stored one
        if key == SettingKey::Password && value.as_deref() == Some(REDACTED_PASSWORD) {
            tracing::debug!(notifier = %device.info.name, "Keeping stored password");
        } else {
            self.store.put_setting(id, key.as_str(), value.as_deref()).await?;
            tracing::info!(notifier = %device.info.name, "Setting `{key}` updated");
        }

        if let Err(err) = self.initialize(&device).await {
            tracing::warn!(notifier = %device.info.name, "{err}");
        }

        self.get_settings(id).await
    }

    /// Renders the notification as email and delivers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the notifier does not exist or is not configured,
    /// the media can not be converted or the SMTP server refuses the email.
    pub async fn send_notification(
        &self,
        id: Uuid,
        request: SendNotificationRequest,
    ) -> Result<SendNotificationResponse> {
        let device = self.device(id).await?;

        let result = self.dispatch(&device, request).await;
        match &result {
            Ok(response) => {
                self.metrics.record_sent();
                if response.attachment {
                    self.metrics.record_attachment();
                }
            }
            Err(err) => self.metrics.record_failed(err.failure_reason()),
        }
        result
    }

    #[tracing::instrument(skip_all, fields(notifier = %device.info.name))]
    async fn dispatch(
        &self,
        device: &NotifierDevice,
        SendNotificationRequest { title, body, media }: SendNotificationRequest,
    ) -> Result<SendNotificationResponse> {
        let Mailer { client, recipients } = self
            .initialize(device)
            .await?
            .ok_or(Error::NotifierNotConfigured { id: device.info.id })?;

        let mut notification = Notification::message(title, body);
        if let Some(media) = media {
            let png = self.media.to_png(&media).await?;
            notification = notification.with_attachment(Attachment::png(png));
        }
        let attachment = notification.attachment().is_some();

        tracing::info!("Sending email to {recipients}...");
        client.send_notification(&notification).await.context(error::SendEmailSnafu)?;
        tracing::info!("Email sent successfully.");

        Ok(SendNotificationResponse { notifier_id: device.info.id, recipients, attachment })
    }

    /// Builds a client of `device` from its current settings, `None` while
    /// settings are incomplete.
    ///
    /// One initialization runs at a time per device, later callers see the
    /// settings stored before they acquired the lock.
    async fn initialize(&self, device: &NotifierDevice) -> Result<Option<Mailer>> {
        let _initializing = device.initializing.lock().await;
        let settings = self.smtp_settings(device.info.id).await?;

        let Some(config) = smtp_config(&settings, self.smtp_timeout) else {
            tracing::info!(notifier = %device.info.name, "SMTP settings incomplete, client not initialized");
            return Ok(None);
        };

        let client = self.connector.connect(&config).await.context(error::ConnectSmtpSnafu)?;
        tracing::info!(
            notifier = %device.info.name,
            server = %config.server,
            port = config.port,
            "SMTP client initialized"
        );

        Ok(Some(Mailer { client, recipients: config.to }))
    }

    async fn smtp_settings(&self, id: Uuid) -> Result<SmtpSettings> {
        Ok(SmtpSettings::from_stored(&self.store.get_settings(id).await?))
    }

    async fn device(&self, id: Uuid) -> Result<Arc<NotifierDevice>> {
        if let Some(device) = self.devices.read().await.get(&id) {
            return Ok(Arc::clone(device));
        }

        let notifier = self.store.get_notifier(id).await?.ok_or(Error::NotifierNotFound { id })?;
        let device = Arc::clone(
            self.devices
                .write()
                .await
                .entry(id)
                .or_insert_with(|| Arc::new(NotifierDevice::new(&notifier))),
        );
        Ok(device)
    }
}

impl NotifierDevice {
    fn new(info: &Notifier) -> Self { Self { info: info.clone(), initializing: Mutex::new(()) } }
}
