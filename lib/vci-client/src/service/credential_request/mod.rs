pub mod dto;
pub mod service;

mod mapper;

use std::sync::Arc;

use crate::config::VCIClientConfig;
use crate::provider::http_client::HttpClient;

/// Builds and sends format-specific requests to the credential endpoint
#[derive(Clone)]
pub struct CredentialRequestService {
    http_client: Arc<dyn HttpClient>,
    config: Arc<VCIClientConfig>,
}

impl CredentialRequestService {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>, config: Arc<VCIClientConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }
}
