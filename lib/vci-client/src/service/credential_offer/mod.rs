pub mod dto;
pub mod service;

pub(crate) mod validator;

use std::sync::Arc;

use crate::config::VCIClientConfig;
use crate::provider::http_client::HttpClient;

#[derive(Clone)]
pub struct CredentialOfferService {
    http_client: Arc<dyn HttpClient>,
    config: Arc<VCIClientConfig>,
}

impl CredentialOfferService {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>, config: Arc<VCIClientConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }
}
