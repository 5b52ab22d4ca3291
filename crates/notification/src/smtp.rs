//! SMTP client sending notifications with `lettre`.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, Mailboxes},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use snafu::ResultExt;

use crate::{build_email, error, Error, Notification, NotificationClient};

/// Port of SMTP submission over implicit TLS.
pub const DEFAULT_PORT: u16 = 465;

/// Default time allowed for connecting and for each SMTP command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How the session with the SMTP server is secured.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Security {
    /// TLS from the first byte, usually on port 465.
    #[default]
    Implicit,

    /// Plain connection upgraded with STARTTLS when the server offers it.
    /// Servers without STARTTLS are spoken to in plain text.
    StartTls,
}

impl Security {
    #[must_use]
    pub const fn from_ssl_enabled(ssl_enabled: bool) -> Self {
        if ssl_enabled {
            Self::Implicit
        } else {
            Self::StartTls
        }
    }
}

/// Connection settings of one SMTP destination.
#[derive(Clone, Eq, PartialEq)]
pub struct Config {
    pub server: String,
    pub port: u16,
    pub security: Security,
    pub username: String,
    pub password: String,
    pub from: String,
    /// One address or several separated by commas.
    pub to: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &"********")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP client bound to one sender and one set of recipients.
pub struct Client {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    server: String,
    port: u16,
    from: Mailbox,
    to: Mailboxes,
}

impl Client {
    /// Builds a client without contacting the server.
    ///
    /// Must be called within a Tokio runtime, the transport keeps a
    /// connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is invalid or TLS parameters can not be
    /// created for `server`.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let Config { server, port, security, username, password, from, to, timeout } = config;

        let from: Mailbox =
            from.parse().context(error::InvalidAddressSnafu { address: from.clone() })?;
        let to: Mailboxes = to.parse().context(error::InvalidAddressSnafu { address: to.clone() })?;
        if to.iter().next().is_none() {
            return Err(Error::NoRecipient);
        }

        let builder = match security {
            Security::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(server)
                .context(error::CreateTransportSnafu { server: server.clone() })?,
            Security::StartTls => {
                tracing::debug!(%server, port, "STARTTLS is used when offered by the server");
                let parameters = TlsParameters::new(server.clone())
                    .context(error::CreateTransportSnafu { server: server.clone() })?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server.as_str())
                    .tls(Tls::Opportunistic(parameters))
            }
        };

        let transport = builder
            .port(*port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .timeout(Some(*timeout))
            .build();

        Ok(Self { transport, server: server.clone(), port: *port, from, to })
    }

    /// Builds a client and logs in once to make sure the settings work.
    ///
    /// # Errors
    ///
    /// Returns an error if the client can not be built, the server is
    /// unreachable or rejects the credentials.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let client = Self::new(config)?;
        client.verify().await?;
        Ok(client)
    }

    /// Opens a session, including TLS and authentication, and closes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session can not be established.
    pub async fn verify(&self) -> Result<(), Error> {
        let responding = self
            .transport
            .test_connection()
            .await
            .context(error::ConnectSmtpSnafu { server: self.server.clone(), port: self.port })?;

        if responding {
            tracing::debug!(server = %self.server, port = self.port, "SMTP session established");
            Ok(())
        } else {
            Err(Error::SmtpNotResponding { server: self.server.clone(), port: self.port })
        }
    }

    #[must_use]
    pub fn recipients(&self) -> String {
        self.to.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

#[async_trait]
impl NotificationClient for Client {
    async fn send_notification(&self, notification: &Notification) -> Result<(), Error> {
        let email = build_email(&self.from, &self.to, notification)?;

        let _response = self.transport.send(email).await.context(error::SendEmailSnafu)?;

        tracing::info!(to = %self.recipients(), "Email sent successfully");
        Ok(())
    }
}
