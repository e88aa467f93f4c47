use super::FlowService;
use super::dto::{AuthorizeUserFn, TokenResponseFn};
use crate::error::{FlowStage, VCIClientError};
use crate::model::credential::ClientMetadata;
use crate::model::grant::GrantType;
use crate::service::authorization_server::authorization_url::AuthorizationRequest;
use crate::service::credential_offer::dto::AuthorizationCodeGrant;
use crate::service::issuer_metadata::dto::IssuerMetadataResult;
use crate::service::pkce::PkceSession;
use crate::service::token::dto::TokenResponse;

impl FlowService {
    /// A fresh PKCE session is generated for every attempt
    pub(super) async fn authorization_code_token(
        &self,
        metadata: &IssuerMetadataResult,
        client_metadata: &ClientMetadata,
        grant: Option<&AuthorizationCodeGrant>,
        authorize_user: &AuthorizeUserFn,
        get_token_response: &TokenResponseFn,
    ) -> Result<TokenResponse, VCIClientError> {
        let issuer_metadata = &metadata.issuer_metadata;
        let session =
            PkceSession::generate().map_err(|error| error.in_stage(FlowStage::Authorization))?;

        let authorization_server = self
            .authorization_server_service
            .resolve(
                issuer_metadata,
                GrantType::AuthorizationCode,
                grant.and_then(|grant| grant.authorization_server.as_deref()),
            )
            .await
            .map_err(|error| error.in_stage(FlowStage::AuthorizationServerResolution))?;

        let authorization_endpoint = authorization_server
            .authorization_endpoint
            .as_deref()
            .ok_or_else(|| {
                VCIClientError::DownloadFailed("Missing authorization endpoint".to_string())
                    .in_stage(FlowStage::Authorization)
            })?;

        let token_endpoint = issuer_metadata
            .token_endpoint
            .as_deref()
            .or(authorization_server.token_endpoint.as_deref())
            .ok_or_else(|| {
                VCIClientError::DownloadFailed("Missing token endpoint".to_string())
                    .in_stage(FlowStage::TokenAcquisition)
            })?;

        let authorization_url =
            AuthorizationRequest::new(client_metadata, &issuer_metadata.scope, &session)
                .with_issuer_state(grant.and_then(|grant| grant.issuer_state.to_owned()))
                .to_url(authorization_endpoint)
                .map_err(|error| error.in_stage(FlowStage::Authorization))?;

        tracing::debug!(%authorization_endpoint, "Requesting user authorization");
        let authorization_code = authorize_user(authorization_url.to_string())
            .await
            .map_err(|error| VCIClientError::from_host(error).in_stage(FlowStage::Authorization))?;

        self.token_service
            .get_access_token_with_authorization_code(
                get_token_response,
                token_endpoint,
                &authorization_code,
                Some(client_metadata.client_id.to_owned()),
                Some(client_metadata.redirect_uri.to_owned()),
                Some(session.code_verifier),
            )
            .await
            .map_err(|error| error.in_stage(FlowStage::TokenAcquisition))
    }
}
