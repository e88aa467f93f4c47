use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SecureStorageError {
    #[error("Secure storage failure: `{0}`")]
    Failed(String),
}

/// Host-provided key-value store for values that must survive restarts
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait SecureStorage: Send + Sync {
    async fn save(&self, key: &str, value: String) -> Result<(), SecureStorageError>;

    async fn load(&self, key: &str) -> Result<Option<String>, SecureStorageError>;
}

/// Process-local store, for hosts without a keychain and for tests
#[derive(Default)]
pub struct InMemorySecureStorage {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl SecureStorage for InMemorySecureStorage {
    async fn save(&self, key: &str, value: String) -> Result<(), SecureStorageError> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, SecureStorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }
}
