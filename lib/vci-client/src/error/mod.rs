use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::provider::http_client;

/// The single failure type returned by every public entry point
#[derive(Debug, Error)]
pub enum VCIClientError {
    #[error("Credential offer fetch failed: {0}")]
    OfferFetchFailed(String),
    #[error("Issuer metadata fetch failed: {0}")]
    IssuerMetadataFetch(#[from] IssuerMetadataError),
    #[error("Authorization server discovery failed: {0}")]
    AuthorizationServerDiscovery(String),
    #[error("Download failed: {0}")]
    DownloadFailed(String),
    #[error("Invalid access token: {0}")]
    InvalidAccessToken(String),
    #[error("Network request timed out: {0}")]
    NetworkRequestTimeout(String),
    #[error("Network request failed: {0}")]
    NetworkRequestFailed(String),
    #[error("Invalid data provided: {0}")]
    InvalidDataProvided(String),
    #[error("Issuer not trusted: {0}")]
    IssuerUntrusted(String),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum IssuerMetadataError {
    #[error("Issuer metadata response is empty")]
    EmptyResponse,
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Credential configuration not found: {0}")]
    ConfigurationNotFound(String),
    #[error("Unsupported or missing credential format in configuration: {0}")]
    UnsupportedFormat(String),
    #[error("Missing doctype")]
    MissingDoctype,
    #[error("Invalid issuer metadata document: {0}")]
    InvalidDocument(String),
    #[error("Failed to fetch issuer metadata: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ErrorCode {
    #[strum(serialize = "VCI-000")]
    Unknown,
    #[strum(serialize = "VCI-001")]
    AuthorizationServerDiscovery,
    #[strum(serialize = "VCI-002")]
    DownloadFailed,
    #[strum(serialize = "VCI-003")]
    InvalidAccessToken,
    #[strum(serialize = "VCI-004")]
    InvalidDataProvided,
    #[strum(serialize = "VCI-006")]
    NetworkRequestFailed,
    #[strum(serialize = "VCI-007")]
    NetworkRequestTimeout,
    #[strum(serialize = "VCI-008")]
    OfferFetchFailed,
    #[strum(serialize = "VCI-009")]
    IssuerMetadataFetch,
    #[strum(serialize = "VCI-010")]
    IssuerUntrusted,
}

pub trait ErrorCodeMixin {
    fn error_code(&self) -> ErrorCode;
}

impl ErrorCodeMixin for VCIClientError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::OfferFetchFailed(_) => ErrorCode::OfferFetchFailed,
            Self::IssuerMetadataFetch(_) => ErrorCode::IssuerMetadataFetch,
            Self::AuthorizationServerDiscovery(_) => ErrorCode::AuthorizationServerDiscovery,
            Self::DownloadFailed(_) => ErrorCode::DownloadFailed,
            Self::InvalidAccessToken(_) => ErrorCode::InvalidAccessToken,
            Self::NetworkRequestTimeout(_) => ErrorCode::NetworkRequestTimeout,
            Self::NetworkRequestFailed(_) => ErrorCode::NetworkRequestFailed,
            Self::InvalidDataProvided(_) => ErrorCode::InvalidDataProvided,
            Self::IssuerUntrusted(_) => ErrorCode::IssuerUntrusted,
            Self::Unknown(_) => ErrorCode::Unknown,
        }
    }
}

/// Step of a download flow, used to label failures leaving an orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FlowStage {
    #[strum(serialize = "Credential offer resolution")]
    OfferResolution,
    #[strum(serialize = "Issuer metadata resolution")]
    MetadataResolution,
    #[strum(serialize = "Issuer trust check")]
    TrustCheck,
    #[strum(serialize = "Authorization server resolution")]
    AuthorizationServerResolution,
    #[strum(serialize = "User authorization")]
    Authorization,
    #[strum(serialize = "Token acquisition")]
    TokenAcquisition,
    #[strum(serialize = "Proof construction")]
    ProofConstruction,
    #[strum(serialize = "Credential request")]
    CredentialRequest,
}

impl VCIClientError {
    /// Keeps the kind and prepends the stage to the message.
    pub(crate) fn in_stage(self, stage: FlowStage) -> Self {
        let label = |message: String| format!("{stage}: {message}");

        match self {
            Self::OfferFetchFailed(message) => Self::OfferFetchFailed(label(message)),
            Self::AuthorizationServerDiscovery(message) => {
                Self::AuthorizationServerDiscovery(label(message))
            }
            Self::DownloadFailed(message) => Self::DownloadFailed(label(message)),
            Self::InvalidAccessToken(message) => Self::InvalidAccessToken(label(message)),
            Self::NetworkRequestTimeout(message) => Self::NetworkRequestTimeout(label(message)),
            Self::NetworkRequestFailed(message) => Self::NetworkRequestFailed(label(message)),
            Self::InvalidDataProvided(message) => Self::InvalidDataProvided(label(message)),
            Self::IssuerUntrusted(message) => Self::IssuerUntrusted(label(message)),
            Self::Unknown(message) => Self::Unknown(label(message)),
            Self::IssuerMetadataFetch(error) => Self::IssuerMetadataFetch(error),
        }
    }

    /// Host callbacks fail with arbitrary errors; a `VCIClientError` (also one wrapped
    /// with context) is kept, anything else becomes `Unknown`.
    pub(crate) fn from_host(error: anyhow::Error) -> Self {
        match error.downcast::<VCIClientError>() {
            Ok(error) => error,
            Err(error) => Self::Unknown(format!("{error:#}")),
        }
    }
}

impl From<http_client::Error> for VCIClientError {
    fn from(value: http_client::Error) -> Self {
        match value {
            error @ http_client::Error::Timeout => Self::NetworkRequestTimeout(error.to_string()),
            other => Self::NetworkRequestFailed(other.to_string()),
        }
    }
}
