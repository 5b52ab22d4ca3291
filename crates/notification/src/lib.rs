//! # Notification Crate
//!
//! This crate turns notification events into emails and delivers them through
//! an SMTP server.
//!
//! ## Features
//!
//! - Implicit TLS or opportunistic STARTTLS sessions with login
//! - Plain text body with an optional image attachment
//! - Several comma separated recipients
//! - Async/await support

mod error;
mod message;
pub mod smtp;

use async_trait::async_trait;

pub use self::{error::Error, message::build_email};

/// File name used for image attachments of notifications.
pub const IMAGE_ATTACHMENT_NAME: &str = "image.png";

/// Content type used for image attachments of notifications.
pub const IMAGE_ATTACHMENT_CONTENT_TYPE: &str = "image/png";

/// Represents different types of notifications that can be sent.
#[derive(Clone, Debug)]
pub enum Notification {
    /// A titled message with an optional attachment.
    Message {
        /// Becomes the subject of the email.
        title: String,
        /// Plain text body, sent as an empty body when absent.
        body: Option<String>,
        /// At most one attached file.
        attachment: Option<Attachment>,
    },
}

impl Notification {
    #[must_use]
    pub fn message(title: impl Into<String>, body: Option<String>) -> Self {
        Self::Message { title: title.into(), body, attachment: None }
    }

    #[must_use]
    pub fn with_attachment(self, attachment: Attachment) -> Self {
        let Self::Message { title, body, .. } = self;
        Self::Message { title, body, attachment: Some(attachment) }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        let Self::Message { title, .. } = self;
        title
    }

    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        let Self::Message { attachment, .. } = self;
        attachment.as_ref()
    }
}

/// A file attached to a notification email.
#[derive(Clone, Eq, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// Wraps PNG encoded bytes as `image.png`.
    #[must_use]
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            filename: IMAGE_ATTACHMENT_NAME.to_string(),
            content_type: IMAGE_ATTACHMENT_CONTENT_TYPE.to_string(),
            data,
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Trait for notification clients that can send notifications.
#[async_trait]
pub trait NotificationClient: Send + Sync {
    /// Sends a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification fails to send.
    async fn send_notification(&self, notification: &Notification) -> Result<(), Error>;
}
