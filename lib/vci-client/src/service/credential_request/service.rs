use std::time::Duration;

use super::CredentialRequestService;
use super::dto::CredentialResponseDTO;
use super::mapper::create_credential_request_body;
use crate::error::VCIClientError;
use crate::model::credential::CredentialResponse;
use crate::model::proof::Proof;
use crate::service::issuer_metadata::dto::IssuerMetadata;

impl CredentialRequestService {
    /// Requests the credential with `access_token`. Any 2xx answer with an empty
    /// body, such as a deferred `202 Accepted`, yields `None`.
    pub async fn request_credential(
        &self,
        issuer_metadata: &IssuerMetadata,
        credential_configuration_id: &str,
        proof: Proof,
        access_token: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<CredentialResponse>, VCIClientError> {
        let body = create_credential_request_body(
            issuer_metadata,
            proof,
            &self.config.default_ldp_context,
        )?;
        let timeout = timeout.unwrap_or(self.config.network_timeout);

        let response = self
            .http_client
            .post(&issuer_metadata.credential_endpoint)
            .bearer_auth(access_token)
            .json(&body)?
            .timeout(timeout)
            .send()
            .await
            .inspect_err(|error| {
                tracing::warn!(
                    credential_endpoint = %issuer_metadata.credential_endpoint,
                    %error,
                    "Credential request failed"
                )
            })?;

        if !response.status.is_success() {
            let message = response
                .text()
                .or_else(|| response.status.canonical_reason().map(ToOwned::to_owned))
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            tracing::warn!(status = %response.status, "Credential download rejected");
            return Err(VCIClientError::DownloadFailed(message));
        }

        if response.text().is_none() {
            tracing::warn!(
                status = %response.status,
                "Empty credential response body"
            );
            return Ok(None);
        }

        let dto: CredentialResponseDTO = response.json().map_err(|error| {
            VCIClientError::DownloadFailed(format!("Invalid credential response: {error}"))
        })?;

        tracing::info!(
            credential_configuration_id,
            format = %issuer_metadata.format,
            "Credential downloaded"
        );
        Ok(Some(CredentialResponse {
            credential: dto.credential,
            credential_configuration_id: credential_configuration_id.to_string(),
            credential_issuer: issuer_metadata.credential_issuer.to_owned(),
        }))
    }
}
