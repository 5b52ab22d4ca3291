use std::{
    future::IntoFuture,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use base64::Engine;
use chrono::Utc;
use notification::{smtp, Notification, NotificationClient};
use serde_json::{json, Value};
use smtp_notifier_core::{config::MediaConfig, ServerInfo};
use smtp_notifier_metrics::DefaultMetrics;
use smtp_notifier_server::{
    new_router, MailerConnector, MediaConverter, MemoryNotifierStore, ServiceState,
};

// 1x1 transparent PNG
const PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const MEBIBYTE: usize = 1024 * 1024;

type Outbox = Arc<Mutex<Vec<(smtp::Config, Notification)>>>;

/// Accepts every login and keeps sent notifications instead of talking SMTP.
#[derive(Clone, Default)]
struct RecordingConnector {
    outbox: Outbox,
    connections: Arc<Mutex<Vec<smtp::Config>>>,
    reject_login: bool,
    // logins in progress, and the most seen at once
    logging_in: Arc<AtomicUsize>,
    max_logging_in: Arc<AtomicUsize>,
}

struct RecordingClient {
    config: smtp::Config,
    outbox: Outbox,
}

#[async_trait]
impl MailerConnector for RecordingConnector {
    async fn connect(
        &self,
        config: &smtp::Config,
    ) -> Result<Arc<dyn NotificationClient>, notification::Error> {
        self.connections.lock().unwrap().push(config.clone());

        let logging_in = self.logging_in.fetch_add(1, Ordering::SeqCst) + 1;
        let _max = self.max_logging_in.fetch_max(logging_in, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _logging_in = self.logging_in.fetch_sub(1, Ordering::SeqCst);

        if self.reject_login {
            return Err(notification::Error::SmtpNotResponding {
                server: config.server.clone(),
                port: config.port,
            });
        }
        Ok(Arc::new(RecordingClient { config: config.clone(), outbox: self.outbox.clone() }))
    }
}

#[async_trait]
impl NotificationClient for RecordingClient {
    async fn send_notification(&self, notification: &Notification) -> Result<(), notification::Error> {
        self.outbox.lock().unwrap().push((self.config.clone(), notification.clone()));
        Ok(())
    }
}

struct TestApp {
    server: TestServer,
    connector: RecordingConnector,
    metrics: DefaultMetrics,
}

fn create_test_app(connector: RecordingConnector) -> TestApp {
    create_test_app_with_media_limit(connector, MEBIBYTE)
}

fn create_test_app_with_media_limit(connector: RecordingConnector, max_size: usize) -> TestApp {
    let media = MediaConverter::new(&MediaConfig {
        ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
        timeout: Duration::from_secs(2),
        max_size,
    })
    .expect("Failed to create media converter");
    let metrics = DefaultMetrics::new().expect("Failed to create metrics");

    let service_state = ServiceState::new(
        Arc::new(MemoryNotifierStore::new()),
        Arc::new(connector.clone()),
        media,
        metrics.notification().clone(),
        Duration::from_secs(1),
    );
    let server_info = ServerInfo {
        version: "0.1.0".to_string(),
        branch: "main".to_string(),
        commit_hash: "0000000".to_string(),
        storage: "memory".to_string(),
        start_time: Utc::now(),
    };

    let server = TestServer::new(new_router(service_state, server_info))
        .expect("Failed to create test server");
    TestApp { server, connector, metrics }
}

async fn create_notifier(server: &TestServer, name: Value) -> String {
    let response = server.post("/api/v1/notifiers").json(&json!({ "name": name })).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    response.json::<Value>()["data"]["id"].as_str().unwrap().to_string()
}

async fn configure(server: &TestServer, id: &str) {
    for (key, value) in [
        ("server", json!("smtp.example.com")),
        ("port", json!(587)),
        ("ssl_enabled", json!(false)),
        ("username", json!("camera")),
        ("password", json!("app-password")),
        ("from_email", json!("camera@example.com")),
        ("to_email", json!("owner@example.com")),
    ] {
        let response = server
            .put(&format!("/api/v1/notifiers/{id}/settings/{key}"))
            .json(&json!({ "value": value }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "{key}");
    }
}

fn setting<'a>(settings: &'a Value, key: &str) -> &'a Value {
    settings["data"].as_array().unwrap().iter().find(|setting| setting["key"] == key).unwrap()
}

#[tokio::test]
async fn test_server_info() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());

    let response = server.get("/api/v1/info").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["_status"], 200);
    assert_eq!(body["data"]["storage"], "memory");
}

#[tokio::test]
async fn test_unknown_route() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());

    let response = server.get("/api/v1/cameras").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["type"], "NOT_FOUND");
}

#[tokio::test]
async fn test_openapi_document() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());

    let response = server.get("/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let document: Value = response.json();
    assert!(document["paths"]["/api/v1/notifiers/{id}/notifications"]["post"].is_object());
}

#[tokio::test]
async fn test_notifier_lifecycle() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());

    let response = server.get("/api/v1/notifiers/create-settings").await;
    assert_eq!(response.json::<Value>()["data"], json!([{ "title": "Name", "key": "name" }]));

    let unnamed = create_notifier(&server, Value::Null).await;
    let named = create_notifier(&server, json!("Front door")).await;

    let response = server.get(&format!("/api/v1/notifiers/{unnamed}")).await;
    assert_eq!(response.json::<Value>()["data"]["name"], "New SMTP Notifier");

    let notifiers: Value = server.get("/api/v1/notifiers").await.json();
    let names: Vec<_> =
        notifiers["data"].as_array().unwrap().iter().map(|n| n["name"].clone()).collect();
    assert_eq!(names, [json!("New SMTP Notifier"), json!("Front door")]);

    let response = server.delete(&format!("/api/v1/notifiers/{named}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get(&format!("/api/v1/notifiers/{named}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.delete(&format!("/api/v1/notifiers/{named}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_settings() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;

    let settings: Value = server.get(&format!("/api/v1/notifiers/{id}/settings")).await.json();

    let keys: Vec<_> =
        settings["data"].as_array().unwrap().iter().map(|s| s["key"].clone()).collect();
    assert_eq!(
        keys,
        ["server", "port", "ssl_enabled", "username", "password", "from_email", "to_email"]
            .map(Value::from)
    );
    assert_eq!(setting(&settings, "port")["value"], 465);
    assert_eq!(setting(&settings, "port")["type"], "number");
    assert_eq!(setting(&settings, "ssl_enabled")["value"], true);
    assert_eq!(
        setting(&settings, "ssl_enabled")["description"],
        "Require SSL when connecting to the SMTP server. If unset, will attempt to use STARTTLS."
    );
    assert!(setting(&settings, "server").get("value").is_none());
}

#[tokio::test]
async fn test_put_setting_validation() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/port"))
        .json(&json!({ "value": "abc" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "VALIDATION");
    assert_eq!(body["error"]["message"], "Port must be a number.");

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/port"))
        .json(&json!({ "value": 70000 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["message"], "Port must be between 0 and 65535.");

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/smtp_host"))
        .json(&json!({ "value": "smtp.example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .put(&format!("/api/v1/notifiers/{}/settings/server", uuid::Uuid::new_v4()))
        .json(&json!({ "value": "smtp.example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_setting_coerces_values() {
    let TestApp { server, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/port"))
        .json(&json!({ "value": "587" }))
        .await;
    assert_eq!(setting(&response.json(), "port")["value"], 587);

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/ssl_enabled"))
        .json(&json!({ "value": "yes" }))
        .await;
    assert_eq!(setting(&response.json(), "ssl_enabled")["value"], false);

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/ssl_enabled"))
        .json(&json!({ "value": "true" }))
        .await;
    assert_eq!(setting(&response.json(), "ssl_enabled")["value"], true);

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/password"))
        .json(&json!({ "value": "app-password" }))
        .await;
    assert_eq!(setting(&response.json(), "password")["value"], "********");
}

#[tokio::test]
async fn test_settings_initialize_client_once_complete() {
    let TestApp { server, connector, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;

    configure(&server, &id).await;

    let connections = connector.connections.lock().unwrap().clone();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].server, "smtp.example.com");
    assert_eq!(connections[0].port, 587);
    assert_eq!(connections[0].security, smtp::Security::StartTls);
    assert_eq!(connections[0].password, "app-password");
}

#[tokio::test]
async fn test_redacted_password_keeps_stored_password() {
    let TestApp { server, connector, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let response = server
        .put(&format!("/api/v1/notifiers/{id}/settings/password"))
        .json(&json!({ "value": "********" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let connections = connector.connections.lock().unwrap().clone();
    assert_eq!(connections.last().unwrap().password, "app-password");
}

#[tokio::test]
async fn test_unconfigured_notifier_refuses_to_send() {
    let TestApp { server, connector, metrics } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({ "title": "Motion detected" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["message"], "SMTP client not initialized.");
    assert!(connector.outbox.lock().unwrap().is_empty());
    assert_eq!(metrics.notification().failed("not_configured"), 1);
}

#[tokio::test]
async fn test_send_notification_without_media() {
    let TestApp { server, connector, metrics } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({ "title": "Motion detected", "body": "Someone is at the front door" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["recipients"], "owner@example.com");
    assert_eq!(body["data"]["attachment"], false);

    let outbox = connector.outbox.lock().unwrap().clone();
    assert_eq!(outbox.len(), 1);
    let (config, notification) = &outbox[0];
    assert_eq!(config.to, "owner@example.com");
    assert_eq!(notification.title(), "Motion detected");
    assert!(notification.attachment().is_none());
    assert_eq!(metrics.notification().sent(), 1);
    assert_eq!(metrics.notification().attachments(), 0);
}

#[tokio::test]
async fn test_send_notification_with_media() {
    let TestApp { server, connector, metrics } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({
            "title": "Motion detected",
            "media": { "data": PNG, "mimeType": "image/png" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["attachment"], true);

    let outbox = connector.outbox.lock().unwrap().clone();
    let attachment = outbox[0].1.attachment().unwrap();
    assert_eq!(attachment.filename, "image.png");
    assert_eq!(attachment.content_type, "image/png");
    assert_eq!(metrics.notification().attachments(), 1);
}

/// Inline media of `size` bytes starting with the PNG signature.
fn inline_png(size: usize) -> Value {
    let mut data = vec![0_u8; size];
    data[..PNG_SIGNATURE.len()].copy_from_slice(&PNG_SIGNATURE);

    json!({ "data": base64::engine::general_purpose::STANDARD.encode(data), "mimeType": "image/png" })
}

#[tokio::test]
async fn test_send_notification_with_large_inline_media() {
    let TestApp { server, connector, .. } =
        create_test_app_with_media_limit(RecordingConnector::default(), 4 * MEBIBYTE);
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    // about 3.4 MB once encoded, above the default body limit of `axum`
    let size = 5 * MEBIBYTE / 2;
    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({ "title": "Motion detected", "media": inline_png(size) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let outbox = connector.outbox.lock().unwrap().clone();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].1.attachment().unwrap().data.len(), size);
}

#[tokio::test]
async fn test_send_notification_with_inline_media_over_limit() {
    let TestApp { server, connector, metrics } =
        create_test_app_with_media_limit(RecordingConnector::default(), 4 * MEBIBYTE);
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({ "title": "Motion detected", "media": inline_png(4 * MEBIBYTE + 1024) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Media of 4195328 bytes exceeds the limit of 4194304 bytes"
    );
    assert!(connector.outbox.lock().unwrap().is_empty());
    assert_eq!(metrics.notification().failed("media"), 1);
}

#[tokio::test]
async fn test_concurrent_sends_initialize_one_at_a_time() {
    let TestApp { server, connector, .. } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let path = format!("/api/v1/notifiers/{id}/notifications");
    let (first, second) = futures::future::join(
        server.post(&path).json(&json!({ "title": "Motion detected" })).into_future(),
        server.post(&path).json(&json!({ "title": "Doorbell pressed" })).into_future(),
    )
    .await;

    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(connector.outbox.lock().unwrap().len(), 2);
    // one login while configuring, one per send
    assert_eq!(connector.connections.lock().unwrap().len(), 3);
    assert_eq!(connector.max_logging_in.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_send_notification_with_unreadable_media() {
    let TestApp { server, connector, metrics } = create_test_app(RecordingConnector::default());
    let id = create_notifier(&server, json!("Front door")).await;
    configure(&server, &id).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({
            "title": "Motion detected",
            "media": { "url": "ftp://camera.local/snapshot.jpg" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(connector.outbox.lock().unwrap().is_empty());
    assert_eq!(metrics.notification().failed("media"), 1);
}

#[tokio::test]
async fn test_rejected_login_is_reported() {
    let connector = RecordingConnector { reject_login: true, ..RecordingConnector::default() };
    let TestApp { server, metrics, .. } = create_test_app(connector);
    let id = create_notifier(&server, json!("Front door")).await;

    // storing settings succeeds even though the client can not be initialized
    configure(&server, &id).await;

    let response = server
        .post(&format!("/api/v1/notifiers/{id}/notifications"))
        .json(&json!({ "title": "Motion detected" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["error"]["type"], "EXECUTION");
    assert_eq!(metrics.notification().failed("connect"), 1);
}
