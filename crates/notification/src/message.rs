use lettre::{
    message::{header::ContentType, Attachment as AttachmentPart, Mailbox, Mailboxes, MultiPart, SinglePart},
    Message,
};
use snafu::ResultExt;

use crate::{error, Error, Notification};

/// Renders a notification as a `multipart/mixed` email.
///
/// The first part is the plain text body. The attachment, if any, follows as
/// a second part with an `attachment` disposition.
///
/// # Errors
///
/// Returns an error if there is no recipient, the attachment content type is
/// invalid or the message can not be built.
pub fn build_email(
    from: &Mailbox,
    to: &Mailboxes,
    notification: &Notification,
) -> Result<Message, Error> {
    let Notification::Message { title, body, attachment } = notification;

    if to.iter().next().is_none() {
        return Err(Error::NoRecipient);
    }

    let mut builder = Message::builder().from(from.clone()).subject(title.as_str());
    for mailbox in to.iter() {
        builder = builder.to(mailbox.clone());
    }

    let mut parts =
        MultiPart::mixed().singlepart(SinglePart::plain(body.clone().unwrap_or_default()));

    if let Some(attachment) = attachment {
        let content_type = ContentType::parse(&attachment.content_type).map_err(|_| {
            Error::InvalidContentType { content_type: attachment.content_type.clone() }
        })?;
        parts = parts.singlepart(
            AttachmentPart::new(attachment.filename.clone())
                .body(attachment.data.clone(), content_type),
        );
    }

    builder.multipart(parts).context(error::BuildEmailSnafu)
}
