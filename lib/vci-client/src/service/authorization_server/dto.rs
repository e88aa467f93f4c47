use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// <https://datatracker.ietf.org/doc/html/rfc8414#section-2>
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationServerMetadata {
    pub issuer: String,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub grant_types_supported: Option<Vec<String>>,
}
