use std::time::Duration;

use super::FlowService;
use super::dto::{CheckIssuerTrustFn, OfferFlowCallbacks, ProofJwtFn, TrustedIssuerFlowCallbacks};
use crate::error::{FlowStage, VCIClientError};
use crate::model::credential::{ClientMetadata, CredentialResponse};
use crate::model::proof::Proof;
use crate::service::credential_offer::dto::OfferGrant;
use crate::service::issuer_metadata::dto::IssuerMetadataResult;
use crate::service::token::dto::TokenResponse;

impl FlowService {
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn download_by_offer(
        &self,
        offer: &str,
        client_metadata: &ClientMetadata,
        callbacks: &OfferFlowCallbacks,
        timeout: Option<Duration>,
    ) -> Result<CredentialResponse, VCIClientError> {
        let offer = self
            .credential_offer_service
            .resolve_credential_offer(offer)
            .await
            .map_err(|error| error.in_stage(FlowStage::OfferResolution))?;

        let credential_configuration_id = match offer.credential_configuration_ids.as_slice() {
            [id] => id.as_str(),
            _ => {
                return Err(VCIClientError::DownloadFailed(
                    "Batch credential request is not supported".to_string(),
                ));
            }
        };

        let grant = offer.grant().ok_or_else(|| {
            VCIClientError::OfferFetchFailed(
                "Credential offer does not contain a supported grant type".to_string(),
            )
            .in_stage(FlowStage::OfferResolution)
        })?;

        let metadata = self
            .issuer_metadata_service
            .resolve(&offer.credential_issuer, credential_configuration_id)
            .await
            .map_err(|error| error.in_stage(FlowStage::MetadataResolution))?;

        self.ensure_issuer_trust(&metadata, callbacks.check_issuer_trust.as_ref())
            .await
            .map_err(|error| error.in_stage(FlowStage::TrustCheck))?;

        tracing::info!(
            credential_issuer = %offer.credential_issuer,
            credential_configuration_id,
            pre_authorized = matches!(grant, OfferGrant::PreAuthorizedCode(_)),
            "Downloading credential by offer"
        );

        let token = match grant {
            OfferGrant::PreAuthorizedCode(grant) => {
                self.pre_authorized_token(
                    &metadata,
                    &grant,
                    callbacks.get_tx_code.as_ref(),
                    &callbacks.get_token_response,
                )
                .await?
            }
            OfferGrant::AuthorizationCode(grant) => {
                self.authorization_code_token(
                    &metadata,
                    client_metadata,
                    Some(&grant),
                    &callbacks.authorize_user,
                    &callbacks.get_token_response,
                )
                .await?
            }
        };

        self.request_credential(&metadata, token, &callbacks.get_proof_jwt, timeout)
            .await
    }

    /// Authorization-code download from an issuer the host already trusts
    #[tracing::instrument(level = "debug", skip_all, fields(%credential_issuer))]
    pub async fn download_from_trusted_issuer(
        &self,
        credential_issuer: &str,
        credential_configuration_id: &str,
        client_metadata: &ClientMetadata,
        callbacks: &TrustedIssuerFlowCallbacks,
        timeout: Option<Duration>,
    ) -> Result<CredentialResponse, VCIClientError> {
        let metadata = self
            .issuer_metadata_service
            .resolve(credential_issuer, credential_configuration_id)
            .await
            .map_err(|error| error.in_stage(FlowStage::MetadataResolution))?;

        let token = self
            .authorization_code_token(
                &metadata,
                client_metadata,
                None,
                &callbacks.authorize_user,
                &callbacks.get_token_response,
            )
            .await?;

        self.request_credential(&metadata, token, &callbacks.get_proof_jwt, timeout)
            .await
    }

    async fn ensure_issuer_trust(
        &self,
        metadata: &IssuerMetadataResult,
        check_issuer_trust: Option<&CheckIssuerTrustFn>,
    ) -> Result<(), VCIClientError> {
        let Some(check_issuer_trust) = check_issuer_trust else {
            return Ok(());
        };

        let credential_issuer = &metadata.issuer_metadata.credential_issuer;
        if self.trusted_issuer_registry.is_trusted(credential_issuer).await {
            tracing::debug!(%credential_issuer, "Issuer already trusted");
            return Ok(());
        }

        let consented = check_issuer_trust(credential_issuer.to_owned(), metadata.issuer_display())
            .await
            .map_err(VCIClientError::from_host)?;
        if !consented {
            return Err(VCIClientError::IssuerUntrusted(format!(
                "Issuer {credential_issuer} not trusted by user"
            )));
        }

        self.trusted_issuer_registry
            .mark_trusted(credential_issuer)
            .await
    }

    async fn request_credential(
        &self,
        metadata: &IssuerMetadataResult,
        token: TokenResponse,
        get_proof_jwt: &ProofJwtFn,
        timeout: Option<Duration>,
    ) -> Result<CredentialResponse, VCIClientError> {
        let issuer_metadata = &metadata.issuer_metadata;

        let jwt = get_proof_jwt(
            issuer_metadata.credential_issuer.to_owned(),
            token.c_nonce,
            metadata.proof_signing_algorithms(),
        )
        .await
        .map_err(|error| VCIClientError::from_host(error).in_stage(FlowStage::ProofConstruction))?;

        let response = self
            .credential_request_service
            .request_credential(
                issuer_metadata,
                &metadata.credential_configuration_id,
                Proof::jwt(jwt),
                &token.access_token,
                timeout,
            )
            .await
            .map_err(|error| error.in_stage(FlowStage::CredentialRequest))?;

        match response {
            Some(response) if !response.credential.is_null() => Ok(response),
            _ => Err(VCIClientError::DownloadFailed(
                "No credential in credential response".to_string(),
            )
            .in_stage(FlowStage::CredentialRequest)),
        }
    }
}

