use serde_json::Value;

use super::dto::{CredentialDefinition, CredentialRequestBody};
use crate::error::VCIClientError;
use crate::model::proof::Proof;
use crate::service::issuer_metadata::dto::{CredentialFormat, IssuerMetadata};

/// Collects every field the format needs before building the body
pub(super) fn create_credential_request_body(
    issuer_metadata: &IssuerMetadata,
    proof: Proof,
    default_context: &[String],
) -> Result<CredentialRequestBody, VCIClientError> {
    let mut invalid_fields = vec![];

    let body = match &issuer_metadata.format {
        CredentialFormat::LdpVc { types, context } => {
            let types = types.as_deref().unwrap_or_default();
            if types.is_empty() {
                invalid_fields.push("credentialType");
            }

            let context = match context {
                Some(context) => context.to_owned(),
                None => default_context
                    .iter()
                    .map(|context| Value::String(context.to_owned()))
                    .collect(),
            };

            CredentialRequestBody::LdpVc {
                credential_definition: CredentialDefinition {
                    context,
                    types: types.to_vec(),
                },
                proof,
            }
        }
        CredentialFormat::MsoMdoc { doctype, claims } => {
            if doctype.trim().is_empty() {
                invalid_fields.push("doctype");
            }

            CredentialRequestBody::MsoMdoc {
                doctype: doctype.to_owned(),
                claims: claims.to_owned(),
                proof,
            }
        }
    };

    if !invalid_fields.is_empty() {
        return Err(VCIClientError::InvalidDataProvided(format!(
            "Missing {} in issuer metadata",
            invalid_fields.join(", ")
        )));
    }

    Ok(body)
}
