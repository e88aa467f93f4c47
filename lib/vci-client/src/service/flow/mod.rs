pub mod dto;
pub mod service;

mod authorization_code;
mod pre_authorized;

use crate::service::authorization_server::AuthorizationServerService;
use crate::service::credential_offer::CredentialOfferService;
use crate::service::credential_request::CredentialRequestService;
use crate::service::issuer_metadata::IssuerMetadataService;
use crate::service::token::TokenService;
use crate::service::trusted_issuer::TrustedIssuerRegistry;

/// Sequences the protocol steps of a download and labels failures with the
/// step they came from
#[derive(Clone)]
pub struct FlowService {
    credential_offer_service: CredentialOfferService,
    issuer_metadata_service: IssuerMetadataService,
    authorization_server_service: AuthorizationServerService,
    token_service: TokenService,
    credential_request_service: CredentialRequestService,
    trusted_issuer_registry: TrustedIssuerRegistry,
}

impl FlowService {
    pub(crate) fn new(
        credential_offer_service: CredentialOfferService,
        issuer_metadata_service: IssuerMetadataService,
        authorization_server_service: AuthorizationServerService,
        token_service: TokenService,
        credential_request_service: CredentialRequestService,
        trusted_issuer_registry: TrustedIssuerRegistry,
    ) -> Self {
        Self {
            credential_offer_service,
            issuer_metadata_service,
            authorization_server_service,
            token_service,
            credential_request_service,
            trusted_issuer_registry,
        }
    }
}

#[cfg(test)]
mod test;
