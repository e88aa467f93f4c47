use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::VCIClientError;
use crate::provider::secure_storage::{SecureStorage, SecureStorageError};

/// Issuer identities the user consented to, stored as a JSON array under one key
#[derive(Clone)]
pub struct TrustedIssuerRegistry {
    secure_storage: Arc<dyn SecureStorage>,
    storage_key: String,
    // serializes read-modify-write of the stored set
    write_lock: Arc<Mutex<()>>,
}

impl TrustedIssuerRegistry {
    pub(crate) fn new(secure_storage: Arc<dyn SecureStorage>, storage_key: String) -> Self {
        Self {
            secure_storage,
            storage_key,
            write_lock: Default::default(),
        }
    }

    pub async fn is_trusted(&self, issuer: &str) -> bool {
        self.trusted_issuers()
            .await
            .iter()
            .any(|trusted| trusted == issuer)
    }

    pub async fn mark_trusted(&self, issuer: &str) -> Result<(), VCIClientError> {
        let _guard = self.write_lock.lock().await;

        let mut issuers = self.load_issuers().await.map_err(|error| {
            VCIClientError::Unknown(format!("Failed to load trusted issuers: {error}"))
        })?;
        if issuers.iter().any(|trusted| trusted == issuer) {
            return Ok(());
        }
        issuers.push(issuer.to_string());

        let value = serde_json::to_string(&issuers).map_err(|error| {
            VCIClientError::Unknown(format!("Failed to serialize trusted issuers: {error}"))
        })?;
        self.secure_storage
            .save(&self.storage_key, value)
            .await
            .map_err(|error| VCIClientError::Unknown(error.to_string()))?;

        tracing::info!(%issuer, "Issuer marked as trusted");
        Ok(())
    }

    /// Unreadable or corrupt stored sets count as empty
    pub async fn trusted_issuers(&self) -> Vec<String> {
        self.load_issuers().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "Failed to load trusted issuers");
            vec![]
        })
    }

    /// A corrupt stored set is discarded; a failing store is reported so writers
    /// never overwrite decisions they could not read.
    async fn load_issuers(&self) -> Result<Vec<String>, SecureStorageError> {
        let Some(stored) = self.secure_storage.load(&self.storage_key).await? else {
            return Ok(vec![]);
        };

        Ok(serde_json::from_str(&stored).unwrap_or_else(|error| {
            tracing::warn!(%error, "Discarding corrupt trusted issuer set");
            vec![]
        }))
    }
}
