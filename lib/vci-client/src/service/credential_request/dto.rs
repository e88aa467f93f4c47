use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::proof::Proof;

/// <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html#section-8.2>
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "format")]
pub enum CredentialRequestBody {
    #[serde(rename = "ldp_vc")]
    LdpVc {
        credential_definition: CredentialDefinition,
        proof: Proof,
    },
    #[serde(rename = "mso_mdoc")]
    MsoMdoc {
        doctype: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        claims: Option<Value>,
        proof: Proof,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CredentialDefinition {
    #[serde(rename = "@context")]
    pub context: Vec<Value>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct CredentialResponseDTO {
    #[serde(default)]
    pub credential: Value,
}
