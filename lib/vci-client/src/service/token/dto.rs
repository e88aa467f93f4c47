use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::VCIClientError;
use crate::model::grant::GrantType;

/// Host token exchange: posts the request to its `token_endpoint`
pub type TokenResponseFn =
    Arc<dyn Fn(TokenRequest) -> BoxFuture<'static, anyhow::Result<TokenResponse>> + Send + Sync>;

/// Token request handed to the host; only the fields of `grant_type` are set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequest {
    pub grant_type: GrantType,
    pub token_endpoint: String,
    pub authorization_code: Option<String>,
    pub pre_authorized_code: Option<String>,
    pub tx_code: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
}

/// `application/x-www-form-urlencoded` body of a token request
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "grant_type")]
pub enum TokenRequestForm<'a> {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    PreAuthorizedCode {
        #[serde(rename = "pre-authorized_code")]
        pre_authorized_code: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        tx_code: Option<&'a str>,
    },
    #[serde(rename = "authorization_code")]
    AuthorizationCode {
        code: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        client_id: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect_uri: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        code_verifier: Option<&'a str>,
    },
}

impl TokenRequest {
    pub fn form(&self) -> Result<TokenRequestForm<'_>, VCIClientError> {
        match self.grant_type {
            GrantType::PreAuthorizedCode => Ok(TokenRequestForm::PreAuthorizedCode {
                pre_authorized_code: required(&self.pre_authorized_code, "pre-authorized_code")?,
                tx_code: self.tx_code.as_deref(),
            }),
            GrantType::AuthorizationCode => Ok(TokenRequestForm::AuthorizationCode {
                code: required(&self.authorization_code, "code")?,
                client_id: self.client_id.as_deref(),
                redirect_uri: self.redirect_uri.as_deref(),
                code_verifier: self.code_verifier.as_deref(),
            }),
            GrantType::Implicit => Err(VCIClientError::DownloadFailed(format!(
                "Unsupported grant type for token request: {}",
                self.grant_type
            ))),
        }
    }

    pub fn to_form_string(&self) -> Result<String, VCIClientError> {
        serde_urlencoded::to_string(self.form()?).map_err(|error| {
            VCIClientError::InvalidDataProvided(format!("Token request encoding: {error}"))
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, VCIClientError> {
    value
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| VCIClientError::DownloadFailed(format!("Token request without {name}")))
}

/// <https://datatracker.ietf.org/doc/html/rfc6749#section-5.1>
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub c_nonce: Option<String>,
    pub c_nonce_expires_in: Option<u64>,
}
