use snafu::Snafu;

/// Errors that can occur in the notification crate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An address in the sender or recipient field is malformed.
    #[snafu(display("Invalid email address `{address}`, error: {source}"))]
    InvalidAddress { address: String, source: lettre::address::AddressError },

    /// The recipient field does not contain any address.
    #[snafu(display("No recipient address configured"))]
    NoRecipient,

    /// The attachment declares an unusable content type.
    #[snafu(display("Invalid attachment content type `{content_type}`"))]
    InvalidContentType { content_type: String },

    /// Failed to build email.
    #[snafu(display("Failed to build email message, error: {source}"))]
    BuildEmail { source: lettre::error::Error },

    /// Failed to create the SMTP transport.
    #[snafu(display("Failed to create SMTP transport for {server}, error: {source}"))]
    CreateTransport { server: String, source: lettre::transport::smtp::Error },

    /// Connecting or logging in to the SMTP server failed.
    #[snafu(display("Error connecting to SMTP server {server}:{port}, error: {source}"))]
    ConnectSmtp { server: String, port: u16, source: lettre::transport::smtp::Error },

    /// The SMTP server accepted the connection but did not answer `NOOP`.
    #[snafu(display("SMTP server {server}:{port} did not respond"))]
    SmtpNotResponding { server: String, port: u16 },

    /// Failed to send email.
    #[snafu(display("Error sending email, error: {source}"))]
    SendEmail { source: lettre::transport::smtp::Error },
}
