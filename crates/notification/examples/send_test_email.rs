//! Example: Send a test notification through an SMTP server.
//!
//! # Usage
//!
//! ```bash
//! export SMTP_SERVER="smtp.gmail.com"
//! export SMTP_USERNAME="camera@gmail.com"
//! export SMTP_PASSWORD="app-password"
//! export SMTP_TO="owner@example.com"
//! cargo run --example send_test_email
//! ```

use notification::{
    smtp::{Client, Config, Security, DEFAULT_PORT, DEFAULT_TIMEOUT},
    Notification, NotificationClient,
};

fn env(key: &str) -> String { std::env::var(key).unwrap_or_default() }

#[tokio::main]
async fn main() -> Result<(), notification::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let username = env("SMTP_USERNAME");
    let config = Config {
        server: env("SMTP_SERVER"),
        port: std::env::var("SMTP_PORT").ok().and_then(|port| port.parse().ok()).unwrap_or(DEFAULT_PORT),
        security: Security::from_ssl_enabled(env("SMTP_SSL") != "false"),
        from: username.clone(),
        username,
        password: env("SMTP_PASSWORD"),
        to: env("SMTP_TO"),
        timeout: DEFAULT_TIMEOUT,
    };

    tracing::info!("Connecting to {}:{}", config.server, config.port);
    let client = Client::connect(&config).await?;

    let notification = Notification::message(
        "Test notification",
        Some("If you can read this, the SMTP settings work.".to_string()),
    );

    client.send_notification(&notification).await?;

    tracing::info!("Email sent to {}", client.recipients());
    Ok(())
}
