use std::sync::Arc;

use serde_json::{Value, json};
use strum::{AsRefStr, Display};

pub const FORMAT_LDP_VC: &str = "ldp_vc";
pub const FORMAT_MSO_MDOC: &str = "mso_mdoc";

/// Issuer capabilities resolved for one credential configuration
#[derive(Clone, Debug, PartialEq)]
pub struct IssuerMetadata {
    pub credential_issuer: String,
    pub credential_endpoint: String,
    pub token_endpoint: Option<String>,
    pub scope: String,
    pub authorization_servers: Option<Vec<String>>,
    pub format: CredentialFormat,
}

#[derive(Clone, Debug, PartialEq, Display, AsRefStr)]
pub enum CredentialFormat {
    #[strum(serialize = "ldp_vc")]
    LdpVc {
        types: Option<Vec<String>>,
        context: Option<Vec<Value>>,
    },
    #[strum(serialize = "mso_mdoc")]
    MsoMdoc {
        doctype: String,
        claims: Option<Value>,
    },
}

#[derive(Clone, Debug)]
pub struct IssuerMetadataResult {
    pub issuer_metadata: IssuerMetadata,
    pub credential_configuration_id: String,
    /// Issuer identity the document was fetched for
    pub issuer_uri: String,
    pub raw: Arc<Value>,
}

impl IssuerMetadataResult {
    /// `display` entries of the issuer document, `[{}]` when absent
    pub fn issuer_display(&self) -> Value {
        match self.raw.get("display") {
            Some(display @ Value::Array(_)) => display.to_owned(),
            _ => json!([{}]),
        }
    }

    pub fn proof_signing_algorithms(&self) -> Vec<String> {
        self.raw
            .pointer(&format!(
                "/credential_configurations_supported/{}/proof_types_supported/jwt/proof_signing_alg_values_supported",
                escape_pointer_token(&self.credential_configuration_id)
            ))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
