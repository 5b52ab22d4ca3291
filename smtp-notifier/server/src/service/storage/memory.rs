use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::NotifierStore;
use crate::{entity::Notifier, service::error::Result};

#[derive(Debug)]
struct Entry {
    notifier: Notifier,
    settings: HashMap<String, String>,
}

/// Keeps notifiers in process memory, everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryNotifierStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryNotifierStore {
    #[must_use]
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl NotifierStore for MemoryNotifierStore {
    async fn list_notifiers(&self) -> Result<Vec<Notifier>> {
        Ok(self.entries.read().await.iter().map(|entry| entry.notifier.clone()).collect())
    }

    async fn get_notifier(&self, id: Uuid) -> Result<Option<Notifier>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|entry| entry.notifier.id == id)
            .map(|entry| entry.notifier.clone()))
    }

    async fn insert_notifier(&self, id: Uuid, name: &str) -> Result<Notifier> {
        let notifier = Notifier { id, name: name.to_string(), created_at: Utc::now() };
        self.entries
            .write()
            .await
            .push(Entry { notifier: notifier.clone(), settings: HashMap::new() });
        Ok(notifier)
    }

    async fn delete_notifier(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.notifier.id != id);
        Ok(entries.len() != before)
    }

    async fn get_settings(&self, id: Uuid) -> Result<HashMap<String, String>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|entry| entry.notifier.id == id)
            .map(|entry| entry.settings.clone())
            .unwrap_or_default())
    }

    async fn put_setting(&self, id: Uuid, key: &str, value: Option<&str>) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.iter_mut().find(|entry| entry.notifier.id == id) {
            match value {
                Some(value) => {
                    let _previous = entry.settings.insert(key.to_string(), value.to_string());
                }
                None => {
                    let _previous = entry.settings.remove(key);
                }
            }
        }
        Ok(())
    }
}
