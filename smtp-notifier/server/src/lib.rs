pub mod entity;
mod error;
mod service;
mod web;

use std::{future::Future, net::SocketAddr, pin::Pin, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use smtp_notifier_core::{
    config::{Config, PostgresConfig, StorageConfig},
    ServerInfo,
};
use smtp_notifier_metrics::DefaultMetrics;
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::Instrument;

pub use self::{
    error::{Error, Result},
    service::{
        smtp_config,
        storage::{MemoryNotifierStore, NotifierStore, PostgresNotifierStore},
        MailerConnector, MediaConverter, NotifierService, SmtpMailerConnector,
    },
    web::{controller, new_router, ApiDoc, ServiceState},
};

const MIGRATOR: Migrator = Migrator { ignore_missing: true, ..sqlx::migrate!() };

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, metrics, storage, media, smtp } = config;

    let store = initialize_store(&storage).await?;

    let media_converter =
        MediaConverter::new(&media).context(error::InitializeMediaConverterSnafu)?;

    let default_metrics = DefaultMetrics::new()?;

    let service_state = ServiceState::new(
        store,
        Arc::new(SmtpMailerConnector),
        media_converter,
        default_metrics.notification().clone(),
        smtp.timeout,
    );

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager.spawn(
        "Http Server",
        create_web_http_server_future(web.listen_address, service_state, server_info),
    );

    if metrics.enable {
        let _handle = lifecycle_manager.spawn(
            "Metrics server",
            create_metrics_server_future(metrics.listen_address, default_metrics),
        );
    }

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

async fn initialize_store(storage: &StorageConfig) -> Result<Arc<dyn NotifierStore>> {
    match storage {
        StorageConfig::Memory => {
            tracing::info!("Notifier settings are kept in memory");
            Ok(Arc::new(MemoryNotifierStore::new()))
        }
        StorageConfig::Postgres(postgres) => {
            let database = initialize_postgres_pool(postgres).await?;
            Ok(Arc::new(PostgresNotifierStore::new(database)))
        }
    }
}

#[tracing::instrument(
    skip(password, database, ssl_mode, max_connections),
    fields(
        host = %host,
        port = port,
        username = %username
    )
)]
async fn initialize_postgres_pool(
    PostgresConfig {
        host,
        port,
        username,
        password,
        database,
        ssl_mode,
        max_connections,
        application_name,
    }: &PostgresConfig,
) -> Result<PgPool> {
    tracing::info!("Initializing database");

    let connect_opts = PgConnectOptions::new_without_pgpass()
        .host(host)
        .port(*port)
        .username(username)
        .password(password)
        .database(database)
        .ssl_mode(*ssl_mode);

    // append application name if provided
    let connect_opts = if let Some(app_name) = application_name {
        connect_opts.application_name(app_name)
    } else {
        connect_opts
    };

    let pool = PgPoolOptions::new()
        .max_connections(*max_connections)
        .connect_with(connect_opts)
        .await
        .context(error::InitializePostgresPoolSnafu {
            host: host.to_string(),
            port: *port,
            username: username.to_string(),
            database: database.to_string(),
        })?;

    MIGRATOR
        .run(&pool)
        .instrument(tracing::info_span!("migrate"))
        .await
        .context(error::MigrateSchemaSnafu)?;

    Ok(pool)
}

fn create_web_http_server_future(
    listen_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            tracing::info!("Listen Web HTTP server endpoint on {listen_address}");

            let result =
                web::new_api_server(listen_address, service_state, server_info, shutdown_signal)
                    .await;

            match result {
                Ok(()) => {
                    tracing::info!("HTTP server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}

fn create_metrics_server_future<Metrics>(
    listen_address: SocketAddr,
    metrics: Metrics,
) -> impl FnOnce(Shutdown) -> Pin<Box<dyn Future<Output = ExitStatus<Error>> + Send>>
where
    Metrics: smtp_notifier_metrics::Metrics + 'static,
{
    move |signal| {
        async move {
            tracing::info!("Listen metrics endpoint on {listen_address}");
            let result =
                smtp_notifier_metrics::start_metrics_server(listen_address, metrics, signal).await;
            match result {
                Ok(()) => {
                    tracing::info!("Metrics server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}
