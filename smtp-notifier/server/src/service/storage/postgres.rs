use std::collections::HashMap;

use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::PgPool;
use uuid::Uuid;

use super::NotifierStore;
use crate::{
    entity::Notifier,
    service::{
        error::{self, Result},
        sql_executor::NotifierSqlExecutor,
    },
};

/// Keeps notifiers in the `notifiers` and `notifier_settings` tables.
#[derive(Clone, Debug)]
pub struct PostgresNotifierStore {
    db: PgPool,
}

impl PostgresNotifierStore {
    #[inline]
    #[must_use]
    pub const fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl NotifierStore for PostgresNotifierStore {
    async fn list_notifiers(&self) -> Result<Vec<Notifier>> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        conn.list_notifiers().await
    }

    async fn get_notifier(&self, id: Uuid) -> Result<Option<Notifier>> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        conn.get_notifier_by_id(&id).await
    }

    async fn insert_notifier(&self, id: Uuid, name: &str) -> Result<Notifier> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        conn.insert_notifier(&id, name).await
    }

    async fn delete_notifier(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        conn.delete_notifier_by_id(&id).await
    }

    async fn get_settings(&self, id: Uuid) -> Result<HashMap<String, String>> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        Ok(conn.get_settings(&id).await?.into_iter().collect())
    }

    async fn put_setting(&self, id: Uuid, key: &str, value: Option<&str>) -> Result<()> {
        let mut conn = self.db.acquire().await.context(error::AcquireConnectionSnafu)?;
        match value {
            Some(value) => conn.upsert_setting(&id, key, value).await,
            None => conn.delete_setting(&id, key).await,
        }
    }
}
