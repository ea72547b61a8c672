use crate::error::Result;
use async_trait::async_trait;

/// Durable string-to-string storage the ledger persists into.
///
/// Each `set` must replace the value for its key atomically: a reader sees
/// either the old value or the new one, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore>;
