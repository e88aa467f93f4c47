use futures::future::join_all;

use super::AuthorizationServerService;
use super::dto::AuthorizationServerMetadata;
use crate::error::VCIClientError;
use crate::model::grant::{DEFAULT_GRANT_TYPES_SUPPORTED, GrantType};
use crate::service::issuer_metadata::dto::IssuerMetadata;

const OAUTH_AUTHORIZATION_SERVER_WELL_KNOWN_PATH: &str = "/.well-known/oauth-authorization-server";
const OPENID_CONFIGURATION_WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

impl AuthorizationServerService {
    /// Picks the authorization server governing `grant_type`:
    ///
    /// 1. the only server listed by the issuer
    /// 2. the server named by the offer grant
    /// 3. the first valid one of several listed servers, queried concurrently
    /// 4. the credential issuer itself
    pub async fn resolve(
        &self,
        issuer_metadata: &IssuerMetadata,
        grant_type: GrantType,
        offer_authorization_server: Option<&str>,
    ) -> Result<AuthorizationServerMetadata, VCIClientError> {
        let servers = issuer_metadata
            .authorization_servers
            .as_deref()
            .unwrap_or_default();
        let offer_authorization_server =
            offer_authorization_server.filter(|server| !server.trim().is_empty());

        match (servers, offer_authorization_server) {
            ([server], _) => self.discover_and_validate(server, grant_type).await,
            (_, Some(server)) => self.discover_and_validate(server, grant_type).await,
            ([], None) => {
                self.discover_and_validate(&issuer_metadata.credential_issuer, grant_type)
                    .await
            }
            (servers, None) => self.resolve_first_valid(servers, grant_type).await,
        }
    }

    /// All candidates run to completion; the first success in list order wins.
    async fn resolve_first_valid(
        &self,
        servers: &[String],
        grant_type: GrantType,
    ) -> Result<AuthorizationServerMetadata, VCIClientError> {
        let results = join_all(
            servers
                .iter()
                .map(|server| self.discover_and_validate(server, grant_type)),
        )
        .await;

        results
            .into_iter()
            .zip(servers)
            .find_map(|(result, server)| match result {
                Ok(metadata) => Some(metadata),
                Err(error) => {
                    tracing::debug!(%server, %error, "Authorization server candidate rejected");
                    None
                }
            })
            .ok_or_else(|| {
                VCIClientError::AuthorizationServerDiscovery(
                    "None of the authorization servers responded with valid metadata".to_string(),
                )
            })
    }

    pub async fn discover_and_validate(
        &self,
        authorization_server: &str,
        grant_type: GrantType,
    ) -> Result<AuthorizationServerMetadata, VCIClientError> {
        let metadata = self.discover(authorization_server).await?;
        validate_metadata(authorization_server, &metadata, grant_type)?;
        Ok(metadata)
    }

    /// Tries the OAuth well-known location first, then the OpenID one.
    pub async fn discover(
        &self,
        authorization_server: &str,
    ) -> Result<AuthorizationServerMetadata, VCIClientError> {
        let base = authorization_server.trim_end_matches('/');

        for well_known_path in [
            OAUTH_AUTHORIZATION_SERVER_WELL_KNOWN_PATH,
            OPENID_CONFIGURATION_WELL_KNOWN_PATH,
        ] {
            let url = format!("{base}{well_known_path}");
            match self.fetch_metadata(&url).await {
                Ok(Some(metadata)) => return Ok(metadata),
                Ok(None) => tracing::debug!(%url, "Empty authorization server metadata"),
                Err(error) => tracing::warn!(%url, %error, "Authorization server discovery failed"),
            }
        }

        Err(VCIClientError::AuthorizationServerDiscovery(format!(
            "Failed to discover authorization server metadata for {authorization_server} at both endpoints"
        )))
    }

    async fn fetch_metadata(
        &self,
        url: &str,
    ) -> Result<Option<AuthorizationServerMetadata>, VCIClientError> {
        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .timeout(self.config.network_timeout)
            .send()
            .await?
            .error_for_status()?;

        if response.text().is_none() {
            return Ok(None);
        }

        Ok(Some(response.json()?))
    }
}

fn validate_metadata(
    authorization_server: &str,
    metadata: &AuthorizationServerMetadata,
    grant_type: GrantType,
) -> Result<(), VCIClientError> {
    if !authorization_server.trim().is_empty() && metadata.issuer != authorization_server {
        return Err(VCIClientError::AuthorizationServerDiscovery(format!(
            "Issuer mismatch: expected '{authorization_server}', got '{}'",
            metadata.issuer
        )));
    }

    // servers commonly leave the pre-authorized grant out of the list
    let grant_supported = match &metadata.grant_types_supported {
        Some(supported) => supported.iter().any(|grant| grant == grant_type.as_ref()),
        None => DEFAULT_GRANT_TYPES_SUPPORTED.contains(&grant_type),
    };
    if !grant_supported && grant_type != GrantType::PreAuthorizedCode {
        return Err(VCIClientError::AuthorizationServerDiscovery(format!(
            "Grant type '{grant_type}' not supported by authorization server"
        )));
    }

    if grant_type == GrantType::AuthorizationCode
        && metadata
            .authorization_endpoint
            .as_deref()
            .is_none_or(|endpoint| endpoint.trim().is_empty())
    {
        return Err(VCIClientError::AuthorizationServerDiscovery(
            "Missing authorization_endpoint for authorization_code flow".to_string(),
        ));
    }

    Ok(())
}
