#![cfg_attr(feature = "strict", deny(warnings))]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::VCIClientConfig;
use crate::error::VCIClientError;
use crate::model::credential::{ClientMetadata, CredentialResponse};
use crate::provider::http_client::HttpClient;
use crate::provider::http_client::reqwest_client::ReqwestClient;
use crate::provider::secure_storage::{InMemorySecureStorage, SecureStorage};
use crate::service::authorization_server::AuthorizationServerService;
use crate::service::credential_offer::CredentialOfferService;
use crate::service::credential_request::CredentialRequestService;
use crate::service::flow::FlowService;
use crate::service::flow::dto::{OfferFlowCallbacks, TrustedIssuerFlowCallbacks};
use crate::service::issuer_metadata::IssuerMetadataService;
use crate::service::token::TokenService;
use crate::service::trusted_issuer::TrustedIssuerRegistry;

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

/// OpenID4VCI holder client: downloads credentials by offer or from trusted issuers
#[derive(Clone)]
pub struct VCIClient {
    flow_service: FlowService,
    issuer_metadata_service: IssuerMetadataService,
    trusted_issuer_registry: TrustedIssuerRegistry,
}

impl VCIClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        secure_storage: Arc<dyn SecureStorage>,
        config: VCIClientConfig,
    ) -> Self {
        let config = Arc::new(config);

        let issuer_metadata_service =
            IssuerMetadataService::new(http_client.clone(), config.clone());
        let trusted_issuer_registry = TrustedIssuerRegistry::new(
            secure_storage,
            config.trusted_issuers_storage_key.to_owned(),
        );

        let flow_service = FlowService::new(
            CredentialOfferService::new(http_client.clone(), config.clone()),
            issuer_metadata_service.clone(),
            AuthorizationServerService::new(http_client.clone(), config.clone()),
            TokenService,
            CredentialRequestService::new(http_client, config),
            trusted_issuer_registry.clone(),
        );

        Self {
            flow_service,
            issuer_metadata_service,
            trusted_issuer_registry,
        }
    }

    pub fn builder(config: VCIClientConfig) -> VCIClientBuilder {
        VCIClientBuilder::new(config)
    }

    /// Resolves `offer` (a `credential_offer` or `credential_offer_uri` URL) and
    /// downloads its single credential configuration.
    ///
    /// `timeout` bounds the credential request; `None` uses the configured network timeout.
    pub async fn download_by_offer(
        &self,
        offer: &str,
        client_metadata: &ClientMetadata,
        callbacks: &OfferFlowCallbacks,
        timeout: Option<Duration>,
    ) -> Result<CredentialResponse, VCIClientError> {
        self.flow_service
            .download_by_offer(offer, client_metadata, callbacks, timeout)
            .await
    }

    pub async fn download_from_trusted_issuer(
        &self,
        credential_issuer: &str,
        credential_configuration_id: &str,
        client_metadata: &ClientMetadata,
        callbacks: &TrustedIssuerFlowCallbacks,
        timeout: Option<Duration>,
    ) -> Result<CredentialResponse, VCIClientError> {
        self.flow_service
            .download_from_trusted_issuer(
                credential_issuer,
                credential_configuration_id,
                client_metadata,
                callbacks,
                timeout,
            )
            .await
    }

    /// Raw capability document of `credential_issuer`, always fetched
    pub async fn get_issuer_metadata(
        &self,
        credential_issuer: &str,
    ) -> Result<Value, VCIClientError> {
        self.issuer_metadata_service
            .fetch_issuer_metadata(credential_issuer)
            .await
    }

    pub fn trusted_issuers(&self) -> &TrustedIssuerRegistry {
        &self.trusted_issuer_registry
    }
}

pub struct VCIClientBuilder {
    config: VCIClientConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_storage: Option<Arc<dyn SecureStorage>>,
}

impl VCIClientBuilder {
    pub fn new(config: VCIClientConfig) -> Self {
        Self {
            config,
            http_client: None,
            secure_storage: None,
        }
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_secure_storage(mut self, secure_storage: Arc<dyn SecureStorage>) -> Self {
        self.secure_storage = Some(secure_storage);
        self
    }

    /// Falls back to a reqwest transport and a process-local trust store
    pub fn build(self) -> Result<VCIClient, VCIClientError> {
        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => {
                let client = reqwest::Client::builder()
                    .timeout(self.config.network_timeout)
                    .build()
                    .map_err(|error| {
                        VCIClientError::Unknown(format!("Failed to create HTTP client: {error}"))
                    })?;
                Arc::new(ReqwestClient::new(client))
            }
        };

        let secure_storage = self
            .secure_storage
            .unwrap_or_else(|| Arc::new(InMemorySecureStorage::default()));

        Ok(VCIClient::new(http_client, secure_storage, self.config))
    }
}
