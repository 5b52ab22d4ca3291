mod memory;
mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

pub use self::{memory::MemoryNotifierStore, postgres::PostgresNotifierStore};
use crate::{entity::Notifier, service::error::Result};

/// Registry of notifiers together with their settings.
#[async_trait]
pub trait NotifierStore: Send + Sync {
    async fn list_notifiers(&self) -> Result<Vec<Notifier>>;

    async fn get_notifier(&self, id: Uuid) -> Result<Option<Notifier>>;

    async fn insert_notifier(&self, id: Uuid, name: &str) -> Result<Notifier>;

    /// Removes the notifier and every setting stored for it.
    ///
    /// Returns `false` when no such notifier exists.
    async fn delete_notifier(&self, id: Uuid) -> Result<bool>;

    async fn get_settings(&self, id: Uuid) -> Result<HashMap<String, String>>;

    /// Stores `value` under `key`, `None` removes the setting.
    async fn put_setting(&self, id: Uuid, key: &str, value: Option<&str>) -> Result<()>;
}
