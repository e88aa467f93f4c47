pub mod dto;
pub mod service;

mod mapper;

use std::sync::Arc;

use tokio::sync::Mutex;

use self::dto::IssuerMetadataResult;
use crate::config::VCIClientConfig;
use crate::provider::http_client::HttpClient;

/// Fetches and resolves issuer capability documents.
///
/// Clones share a single-entry cache keyed by issuer identity; resolving a
/// different issuer replaces the entry.
#[derive(Clone)]
pub struct IssuerMetadataService {
    http_client: Arc<dyn HttpClient>,
    config: Arc<VCIClientConfig>,
    cache: Arc<Mutex<Option<IssuerMetadataResult>>>,
}

impl IssuerMetadataService {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>, config: Arc<VCIClientConfig>) -> Self {
        Self {
            http_client,
            config,
            cache: Default::default(),
        }
    }
}

#[cfg(test)]
mod test;
