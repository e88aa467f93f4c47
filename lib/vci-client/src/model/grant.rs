use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "authorization_code")]
    #[strum(serialize = "authorization_code")]
    AuthorizationCode,
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    #[strum(serialize = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    PreAuthorizedCode,
    #[serde(rename = "implicit")]
    #[strum(serialize = "implicit")]
    Implicit,
}

/// Assumed when authorization server metadata omits `grant_types_supported`,
/// <https://datatracker.ietf.org/doc/html/rfc8414#section-2>
pub const DEFAULT_GRANT_TYPES_SUPPORTED: [GrantType; 2] =
    [GrantType::AuthorizationCode, GrantType::Implicit];
