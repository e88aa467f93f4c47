use serde::Serialize;
use serde_with::skip_serializing_none;
use url::Url;

use crate::error::VCIClientError;
use crate::model::credential::ClientMetadata;
use crate::service::pkce::PkceSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CodeChallengeMethod {
    S256,
}

/// <https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.1>
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub scope: String,
    pub state: String,
    pub code_challenge: String,
    pub code_challenge_method: CodeChallengeMethod,
    pub nonce: String,

    /// <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html#section-5.1.3-2.1>
    pub issuer_state: Option<String>,
}

impl AuthorizationRequest {
    pub fn new(client_metadata: &ClientMetadata, scope: &str, session: &PkceSession) -> Self {
        Self {
            client_id: client_metadata.client_id.to_owned(),
            redirect_uri: client_metadata.redirect_uri.to_owned(),
            response_type: "code".to_string(),
            scope: scope.to_string(),
            state: session.state.to_owned(),
            code_challenge: session.code_challenge.to_owned(),
            code_challenge_method: CodeChallengeMethod::S256,
            nonce: session.nonce.to_owned(),
            issuer_state: None,
        }
    }

    pub fn with_issuer_state(self, issuer_state: Option<String>) -> Self {
        Self {
            issuer_state,
            ..self
        }
    }

    /// Appends the request as query parameters, keeping any query already on the endpoint
    pub fn to_url(&self, authorization_endpoint: &str) -> Result<Url, VCIClientError> {
        let mut url = Url::parse(authorization_endpoint).map_err(|error| {
            VCIClientError::AuthorizationServerDiscovery(format!(
                "Invalid authorization_endpoint '{authorization_endpoint}': {error}"
            ))
        })?;

        let params = serde_urlencoded::to_string(self).map_err(|error| {
            VCIClientError::InvalidDataProvided(format!("Authorization request encoding: {error}"))
        })?;

        let query = match url.query().filter(|query| !query.is_empty()) {
            Some(existing) => format!("{existing}&{params}"),
            None => params,
        };
        url.set_query(Some(&query));

        Ok(url)
    }
}
