use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use strum::Display;

/// <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html#section-4.1.1>
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialOffer {
    pub credential_issuer: String,
    pub credential_configuration_ids: Vec<String>,
    pub grants: Option<CredentialOfferGrants>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialOfferGrants {
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    pub pre_authorized_code: Option<PreAuthorizedCodeGrant>,
    pub authorization_code: Option<AuthorizationCodeGrant>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreAuthorizedCodeGrant {
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,
    pub tx_code: Option<TxCode>,
    pub authorization_server: Option<String>,
    pub interval: Option<u64>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxCode {
    pub input_mode: Option<TxCodeInputMode>,
    pub length: Option<i64>,
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TxCodeInputMode {
    Numeric,
    Text,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationCodeGrant {
    pub issuer_state: Option<String>,
    pub authorization_server: Option<String>,
}

/// Grant an offer is redeemed with
#[derive(Clone, Debug, PartialEq)]
pub enum OfferGrant {
    PreAuthorizedCode(PreAuthorizedCodeGrant),
    AuthorizationCode(AuthorizationCodeGrant),
}

impl CredentialOffer {
    /// A pre-authorized grant wins over an authorization-code grant; an offer
    /// without grants is redeemed through the authorization-code flow.
    pub fn grant(&self) -> Option<OfferGrant> {
        match &self.grants {
            None => Some(OfferGrant::AuthorizationCode(Default::default())),
            Some(CredentialOfferGrants {
                pre_authorized_code: Some(grant),
                ..
            }) => Some(OfferGrant::PreAuthorizedCode(grant.to_owned())),
            Some(CredentialOfferGrants {
                authorization_code: Some(grant),
                ..
            }) => Some(OfferGrant::AuthorizationCode(grant.to_owned())),
            Some(_) => None,
        }
    }
}
