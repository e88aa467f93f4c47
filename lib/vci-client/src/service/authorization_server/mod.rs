pub mod authorization_url;
pub mod dto;
pub mod service;

use std::sync::Arc;

use crate::config::VCIClientConfig;
use crate::provider::http_client::HttpClient;

#[derive(Clone)]
pub struct AuthorizationServerService {
    http_client: Arc<dyn HttpClient>,
    config: Arc<VCIClientConfig>,
}

impl AuthorizationServerService {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>, config: Arc<VCIClientConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }
}
