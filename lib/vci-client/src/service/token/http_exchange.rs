use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use super::dto::{TokenRequest, TokenResponse, TokenResponseFn};
use crate::error::VCIClientError;
use crate::provider::http_client::HttpClient;

/// Token exchange over the crate's transport, for hosts without their own
#[derive(Clone)]
pub struct HttpTokenExchange {
    http_client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl HttpTokenExchange {
    pub fn new(http_client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }

    pub async fn exchange(&self, request: TokenRequest) -> Result<TokenResponse, VCIClientError> {
        let response = self
            .http_client
            .post(&request.token_endpoint)
            .header("Accept", "application/json")
            .form(request.form()?)?
            .timeout(self.timeout)
            .send()
            .await?;

        let Some(body) = response.text() else {
            return Err(VCIClientError::DownloadFailed(format!(
                "Token response body is empty (HTTP {})",
                response.status
            )));
        };

        if !response.status.is_success() {
            return Err(VCIClientError::InvalidAccessToken(format!(
                "Token endpoint responded with HTTP {}: {body}",
                response.status
            )));
        }

        serde_json::from_str(&body).map_err(|error| {
            VCIClientError::InvalidAccessToken(format!("Failed to parse token response: {error}"))
        })
    }

    /// Adapts the exchange to the `get_token_response` host callback
    pub fn into_callback(self) -> TokenResponseFn {
        Arc::new(
            move |request: TokenRequest| -> BoxFuture<'static, anyhow::Result<TokenResponse>> {
                let exchange = self.clone();
                Box::pin(async move { Ok(exchange.exchange(request).await?) })
            },
        )
    }
}
