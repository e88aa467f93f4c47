use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issued credential, stamped with the configuration and issuer it was requested for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    pub credential: Value,
    pub credential_configuration_id: String,
    pub credential_issuer: String,
}

impl CredentialResponse {
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Identity of the wallet towards authorization servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub client_id: String,
    pub redirect_uri: String,
}
