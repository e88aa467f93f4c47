use serde_json::{Map, Value};

use super::dto::{CredentialFormat, FORMAT_LDP_VC, FORMAT_MSO_MDOC, IssuerMetadata};
use crate::error::IssuerMetadataError;

pub(super) fn resolve_issuer_metadata(
    raw: &Value,
    credential_configuration_id: &str,
) -> Result<IssuerMetadata, IssuerMetadataError> {
    let configurations = raw
        .get("credential_configurations_supported")
        .and_then(Value::as_object)
        .ok_or(IssuerMetadataError::MissingField(
            "credential_configurations_supported",
        ))?;

    let configuration = configurations
        .get(credential_configuration_id)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            IssuerMetadataError::ConfigurationNotFound(credential_configuration_id.to_string())
        })?;

    let credential_endpoint = required_str(raw, "credential_endpoint")?;
    let credential_issuer = required_str(raw, "credential_issuer")?;

    let format = match configuration.get("format").and_then(Value::as_str) {
        Some(FORMAT_MSO_MDOC) => {
            let doctype = configuration
                .get("doctype")
                .and_then(Value::as_str)
                .filter(|doctype| !doctype.trim().is_empty())
                .ok_or(IssuerMetadataError::MissingDoctype)?;

            CredentialFormat::MsoMdoc {
                doctype: doctype.to_string(),
                claims: configuration.get("claims").filter(|c| c.is_object()).cloned(),
            }
        }
        Some(FORMAT_LDP_VC) => {
            let definition = configuration
                .get("credential_definition")
                .and_then(Value::as_object);

            CredentialFormat::LdpVc {
                types: definition
                    .and_then(|definition| definition.get("type"))
                    .and_then(Value::as_array)
                    .map(|types| {
                        types
                            .iter()
                            .filter_map(Value::as_str)
                            .map(ToOwned::to_owned)
                            .collect()
                    }),
                context: definition
                    .and_then(|definition| definition.get("@context"))
                    .and_then(Value::as_array)
                    .cloned(),
            }
        }
        other => {
            return Err(IssuerMetadataError::UnsupportedFormat(
                other.unwrap_or("<missing>").to_string(),
            ));
        }
    };

    Ok(IssuerMetadata {
        credential_issuer,
        credential_endpoint,
        token_endpoint: raw
            .get("token_endpoint")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        scope: compose_scope(configuration),
        authorization_servers: raw
            .get("authorization_servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            }),
        format,
    })
}

fn required_str(raw: &Value, field: &'static str) -> Result<String, IssuerMetadataError> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(IssuerMetadataError::MissingField(field))
}

fn compose_scope(configuration: &Map<String, Value>) -> String {
    let scope = configuration
        .get("scope")
        .and_then(Value::as_str)
        .unwrap_or_default();

    format!("openid {scope}").trim().to_string()
}
