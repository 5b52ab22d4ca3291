pub mod error;
mod server;
mod traits;

use prometheus::{IntCounter, IntCounterVec, Opts};
use snafu::ResultExt;

pub use self::{error::Error, server::start_metrics_server, traits::Metrics};

const NAMESPACE: &str = "smtp_notifier";

#[derive(Clone, Debug)]
pub struct DefaultMetrics {
    registry: prometheus::Registry,

    notification: NotificationMetrics,
}

impl DefaultMetrics {
    /// Creates a registry with every collector of the service registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector can not be created or registered.
    pub fn new() -> Result<Self, Error> {
        let registry = prometheus::Registry::new();
        let notification = NotificationMetrics::new()?;
        notification.register(&registry)?;

        Ok(Self { registry, notification })
    }

    #[inline]
    #[must_use]
    pub const fn notification(&self) -> &NotificationMetrics { &self.notification }
}

impl Metrics for DefaultMetrics {
    fn gather(&self) -> Vec<prometheus::proto::MetricFamily> { self.registry.gather() }
}

/// Counters describing what happened to notification events.
#[derive(Clone, Debug)]
pub struct NotificationMetrics {
    sent: IntCounter,

    failed: IntCounterVec,

    attachments: IntCounter,
}

impl NotificationMetrics {
    /// # Errors
    ///
    /// Returns an error if a counter has an invalid name.
    pub fn new() -> Result<Self, Error> {
        let sent = IntCounter::with_opts(
            Opts::new("notifications_sent_total", "Emails accepted by the SMTP server")
                .namespace(NAMESPACE),
        )
        .context(error::CreateCollectorSnafu { name: "notifications_sent_total" })?;

        let failed = IntCounterVec::new(
            Opts::new("notifications_failed_total", "Notifications that did not produce an email")
                .namespace(NAMESPACE),
            &["reason"],
        )
        .context(error::CreateCollectorSnafu { name: "notifications_failed_total" })?;

        let attachments = IntCounter::with_opts(
            Opts::new("attachments_total", "Image attachments added to emails")
                .namespace(NAMESPACE),
        )
        .context(error::CreateCollectorSnafu { name: "attachments_total" })?;

        Ok(Self { sent, failed, attachments })
    }

    fn register(&self, registry: &prometheus::Registry) -> Result<(), Error> {
        registry.register(Box::new(self.sent.clone())).context(error::RegisterCollectorSnafu)?;
        registry.register(Box::new(self.failed.clone())).context(error::RegisterCollectorSnafu)?;
        registry
            .register(Box::new(self.attachments.clone()))
            .context(error::RegisterCollectorSnafu)?;
        Ok(())
    }

    #[inline]
    pub fn record_sent(&self) { self.sent.inc(); }

    #[inline]
    pub fn record_failed(&self, reason: &str) { self.failed.with_label_values(&[reason]).inc(); }

    #[inline]
    pub fn record_attachment(&self) { self.attachments.inc(); }

    #[inline]
    #[must_use]
    pub fn sent(&self) -> u64 { self.sent.get() }

    #[inline]
    #[must_use]
    pub fn failed(&self, reason: &str) -> u64 { self.failed.with_label_values(&[reason]).get() }

    #[inline]
    #[must_use]
    pub fn attachments(&self) -> u64 { self.attachments.get() }
}
