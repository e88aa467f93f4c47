use super::FlowService;
use super::dto::{TokenResponseFn, TxCodeFn};
use crate::error::{FlowStage, VCIClientError};
use crate::model::grant::GrantType;
use crate::service::credential_offer::dto::PreAuthorizedCodeGrant;
use crate::service::issuer_metadata::dto::IssuerMetadataResult;
use crate::service::token::dto::TokenResponse;

impl FlowService {
    pub(super) async fn pre_authorized_token(
        &self,
        metadata: &IssuerMetadataResult,
        grant: &PreAuthorizedCodeGrant,
        get_tx_code: Option<&TxCodeFn>,
        get_token_response: &TokenResponseFn,
    ) -> Result<TokenResponse, VCIClientError> {
        let issuer_metadata = &metadata.issuer_metadata;

        let authorization_server = self
            .authorization_server_service
            .resolve(
                issuer_metadata,
                GrantType::PreAuthorizedCode,
                grant.authorization_server.as_deref(),
            )
            .await
            .map_err(|error| error.in_stage(FlowStage::AuthorizationServerResolution))?;

        let token_endpoint = authorization_server
            .token_endpoint
            .as_deref()
            .or(issuer_metadata.token_endpoint.as_deref())
            .ok_or_else(|| {
                VCIClientError::DownloadFailed("Missing token endpoint".to_string())
                    .in_stage(FlowStage::TokenAcquisition)
            })?;

        let tx_code = match (&grant.tx_code, get_tx_code) {
            (None, _) => None,
            (Some(_), None) => {
                return Err(VCIClientError::DownloadFailed(
                    "tx_code required but no provider was given".to_string(),
                )
                .in_stage(FlowStage::TokenAcquisition));
            }
            (Some(tx_code), Some(get_tx_code)) => Some(
                get_tx_code(
                    tx_code.input_mode,
                    tx_code.description.to_owned(),
                    tx_code.length,
                )
                .await
                .map_err(|error| {
                    VCIClientError::from_host(error).in_stage(FlowStage::TokenAcquisition)
                })?,
            ),
        };

        self.token_service
            .get_access_token_with_pre_authorized_code(
                get_token_response,
                token_endpoint,
                &grant.pre_authorized_code,
                tx_code,
            )
            .await
            .map_err(|error| error.in_stage(FlowStage::TokenAcquisition))
    }
}
