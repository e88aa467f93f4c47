use std::sync::Arc;

use serde_json::Value;

use super::IssuerMetadataService;
use super::dto::IssuerMetadataResult;
use super::mapper::resolve_issuer_metadata;
use crate::error::{IssuerMetadataError, VCIClientError};
use crate::provider::http_client;

const CREDENTIAL_ISSUER_WELL_KNOWN_PATH: &str = "/.well-known/openid-credential-issuer";

impl IssuerMetadataService {
    /// Resolves the issuer capabilities for `credential_configuration_id`.
    ///
    /// A cached document for the same issuer is reused without refetching.
    pub async fn resolve(
        &self,
        issuer_uri: &str,
        credential_configuration_id: &str,
    ) -> Result<IssuerMetadataResult, VCIClientError> {
        let cached = self
            .cache
            .lock()
            .await
            .as_ref()
            .filter(|cached| cached.issuer_uri == issuer_uri)
            .cloned();

        let raw = match cached {
            Some(cached) if cached.credential_configuration_id == credential_configuration_id => {
                tracing::debug!(%issuer_uri, "Issuer metadata cache hit");
                return Ok(cached);
            }
            Some(cached) => cached.raw,
            None => Arc::new(self.fetch_issuer_metadata(issuer_uri).await?),
        };

        let issuer_metadata = resolve_issuer_metadata(&raw, credential_configuration_id)?;
        let result = IssuerMetadataResult {
            issuer_metadata,
            credential_configuration_id: credential_configuration_id.to_string(),
            issuer_uri: issuer_uri.to_string(),
            raw,
        };

        *self.cache.lock().await = Some(result.clone());

        Ok(result)
    }

    /// Fetches the raw capability document from the issuer's well-known location
    pub async fn fetch_issuer_metadata(&self, issuer_uri: &str) -> Result<Value, VCIClientError> {
        let url = format!(
            "{}{CREDENTIAL_ISSUER_WELL_KNOWN_PATH}",
            issuer_uri.trim_end_matches('/')
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.config.network_timeout)
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?;

        if response.text().is_none() {
            return Err(IssuerMetadataError::EmptyResponse.into());
        }

        let document: Value = response
            .json()
            .map_err(|error| IssuerMetadataError::InvalidDocument(error.to_string()))?;
        if !document.is_object() {
            return Err(
                IssuerMetadataError::InvalidDocument("not a JSON object".to_string()).into(),
            );
        }

        Ok(document)
    }
}

fn transport_error(error: http_client::Error) -> VCIClientError {
    match error {
        timeout @ http_client::Error::Timeout => VCIClientError::from(timeout),
        other => IssuerMetadataError::Transport(other.to_string()).into(),
    }
}
