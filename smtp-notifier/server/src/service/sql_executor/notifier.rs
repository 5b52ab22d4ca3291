use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    entity::Notifier,
    service::error::{self, Result},
};

#[async_trait]
pub trait NotifierSqlExecutor {
    async fn list_notifiers(&mut self) -> Result<Vec<Notifier>>;

    async fn get_notifier_by_id(&mut self, id: &Uuid) -> Result<Option<Notifier>>;

    async fn insert_notifier(&mut self, id: &Uuid, name: &str) -> Result<Notifier>;

    async fn delete_notifier_by_id(&mut self, id: &Uuid) -> Result<bool>;

    async fn get_settings(&mut self, id: &Uuid) -> Result<Vec<(String, String)>>;

    async fn upsert_setting(&mut self, id: &Uuid, key: &str, value: &str) -> Result<()>;

    async fn delete_setting(&mut self, id: &Uuid, key: &str) -> Result<()>;
}

#[async_trait]
impl<E> NotifierSqlExecutor for E
where
    for<'c> &'c mut E: Executor<'c, Database = Postgres>,
    E: Send,
{
    async fn list_notifiers(&mut self) -> Result<Vec<Notifier>> {
        let notifiers =
            sqlx::query_as::<_, Notifier>(include_str!("../../../sql/notifier/list_notifiers.sql"))
                .fetch_all(&mut *self)
                .await
                .context(error::ListNotifiersSnafu)?;

        Ok(notifiers)
    }

    async fn get_notifier_by_id(&mut self, id: &Uuid) -> Result<Option<Notifier>> {
        let notifier = sqlx::query_as::<_, Notifier>(include_str!(
            "../../../sql/notifier/get_notifier_by_id.sql"
        ))
        .bind(id)
        .fetch_optional(&mut *self)
        .await
        .context(error::GetNotifierByIdSnafu)?;

        Ok(notifier)
    }

    async fn insert_notifier(&mut self, id: &Uuid, name: &str) -> Result<Notifier> {
        let notifier =
            sqlx::query_as::<_, Notifier>(include_str!("../../../sql/notifier/insert_notifier.sql"))
                .bind(id)
                .bind(name)
                .fetch_one(&mut *self)
                .await
                .context(error::InsertNotifierSnafu)?;

        Ok(notifier)
    }

    async fn delete_notifier_by_id(&mut self, id: &Uuid) -> Result<bool> {
        let result = sqlx::query(include_str!("../../../sql/notifier/delete_notifier_by_id.sql"))
            .bind(id)
            .execute(&mut *self)
            .await
            .context(error::DeleteNotifierSnafu)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_settings(&mut self, id: &Uuid) -> Result<Vec<(String, String)>> {
        let settings = sqlx::query_as::<_, (String, String)>(include_str!(
            "../../../sql/notifier/get_settings.sql"
        ))
        .bind(id)
        .fetch_all(&mut *self)
        .await
        .context(error::GetSettingsSnafu)?;

        Ok(settings)
    }

    async fn upsert_setting(&mut self, id: &Uuid, key: &str, value: &str) -> Result<()> {
        let _result = sqlx::query(include_str!("../../../sql/notifier/upsert_setting.sql"))
            .bind(id)
            .bind(key)
            .bind(value)
            .execute(&mut *self)
            .await
            .context(error::PutSettingSnafu)?;

        Ok(())
    }

    async fn delete_setting(&mut self, id: &Uuid, key: &str) -> Result<()> {
        let _result = sqlx::query(include_str!("../../../sql/notifier/delete_setting.sql"))
            .bind(id)
            .bind(key)
            .execute(&mut *self)
            .await
            .context(error::PutSettingSnafu)?;

        Ok(())
    }
}
