use super::TokenService;
use super::dto::{TokenRequest, TokenResponse, TokenResponseFn};
use crate::error::VCIClientError;
use crate::model::grant::GrantType;

impl TokenService {
    pub async fn get_access_token_with_pre_authorized_code(
        &self,
        get_token_response: &TokenResponseFn,
        token_endpoint: &str,
        pre_authorized_code: &str,
        tx_code: Option<String>,
    ) -> Result<TokenResponse, VCIClientError> {
        if pre_authorized_code.trim().is_empty() {
            return Err(VCIClientError::DownloadFailed(
                "Pre-authorized code is missing".to_string(),
            ));
        }

        let request = TokenRequest {
            grant_type: GrantType::PreAuthorizedCode,
            token_endpoint: token_endpoint.to_string(),
            authorization_code: None,
            pre_authorized_code: Some(pre_authorized_code.to_string()),
            tx_code,
            client_id: None,
            redirect_uri: None,
            code_verifier: None,
        };

        self.exchange(get_token_response, request).await
    }

    pub async fn get_access_token_with_authorization_code(
        &self,
        get_token_response: &TokenResponseFn,
        token_endpoint: &str,
        authorization_code: &str,
        client_id: Option<String>,
        redirect_uri: Option<String>,
        code_verifier: Option<String>,
    ) -> Result<TokenResponse, VCIClientError> {
        if authorization_code.trim().is_empty() {
            return Err(VCIClientError::DownloadFailed(
                "Authorization code is missing".to_string(),
            ));
        }

        let request = TokenRequest {
            grant_type: GrantType::AuthorizationCode,
            token_endpoint: token_endpoint.to_string(),
            authorization_code: Some(authorization_code.to_string()),
            pre_authorized_code: None,
            tx_code: None,
            client_id,
            redirect_uri,
            code_verifier,
        };

        self.exchange(get_token_response, request).await
    }

    async fn exchange(
        &self,
        get_token_response: &TokenResponseFn,
        request: TokenRequest,
    ) -> Result<TokenResponse, VCIClientError> {
        tracing::debug!(
            grant_type = %request.grant_type,
            token_endpoint = %request.token_endpoint,
            "Requesting access token"
        );

        let response = get_token_response(request)
            .await
            .map_err(VCIClientError::from_host)?;

        if response.access_token.trim().is_empty() {
            return Err(VCIClientError::InvalidAccessToken(
                "Access token missing in token response".to_string(),
            ));
        }

        Ok(response)
    }
}
