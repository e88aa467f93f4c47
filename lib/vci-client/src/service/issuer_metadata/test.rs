use std::sync::Arc;
use std::time::Duration;

use assert2::let_assert;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::IssuerMetadataService;
use super::dto::CredentialFormat;
use crate::config::VCIClientConfig;
use crate::error::{IssuerMetadataError, VCIClientError};
use crate::provider::http_client::reqwest_client::ReqwestClient;

fn setup_service() -> IssuerMetadataService {
    IssuerMetadataService::new(
        Arc::new(ReqwestClient::default()),
        Arc::new(VCIClientConfig::default()),
    )
}

fn issuer_document(issuer: &str) -> Value {
    json!({
        "credential_issuer": issuer,
        "credential_endpoint": format!("{issuer}/credential"),
        "authorization_servers": [format!("{issuer}/auth")],
        "display": [{"name": "Example University", "locale": "en-US"}],
        "credential_configurations_supported": {
            "UniversityDegree": {
                "format": "ldp_vc",
                "scope": "degree",
                "credential_definition": {
                    "@context": ["https://www.w3.org/2018/credentials/v1"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                },
                "proof_types_supported": {
                    "jwt": {"proof_signing_alg_values_supported": ["ES256", "EdDSA"]}
                }
            },
            "DrivingLicence": {
                "format": "mso_mdoc",
                "doctype": "org.iso.18013.5.1.mDL",
                "claims": {"org.iso.18013.5.1": {"given_name": {}}}
            },
            "BlankDoctype": {
                "format": "mso_mdoc",
                "doctype": " "
            },
            "Sdjwt": {
                "format": "vc+sd-jwt",
                "vct": "https://example.com/vct"
            }
        }
    })
}

async fn mount_document(mock_server: &MockServer, document: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-credential-issuer"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_resolve_ldp_vc_configuration() {
    // given
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    mount_document(&mock_server, issuer_document(&issuer), 1).await;
    let service = setup_service();

    // when
    let result = service.resolve(&issuer, "UniversityDegree").await.unwrap();

    // then
    let metadata = &result.issuer_metadata;
    assert_eq!(metadata.credential_issuer, issuer);
    assert_eq!(metadata.credential_endpoint, format!("{issuer}/credential"));
    assert_eq!(metadata.scope, "openid degree");
    assert_eq!(metadata.token_endpoint, None);
    assert_eq!(
        metadata.authorization_servers,
        Some(vec![format!("{issuer}/auth")])
    );
    let_assert!(CredentialFormat::LdpVc { types, context } = &metadata.format);
    assert_eq!(
        types.as_deref(),
        Some(
            [
                "VerifiableCredential".to_string(),
                "UniversityDegreeCredential".to_string(),
            ]
            .as_slice(),
        )
    );
    assert_eq!(
        context.as_deref(),
        Some([json!("https://www.w3.org/2018/credentials/v1")].as_slice())
    );
    assert_eq!(result.proof_signing_algorithms(), vec!["ES256", "EdDSA"]);
    assert_eq!(result.issuer_display()[0]["name"], "Example University");
}

#[tokio::test]
async fn test_resolve_mso_mdoc_configuration() {
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    mount_document(&mock_server, issuer_document(&issuer), 1).await;
    let service = setup_service();

    let result = service.resolve(&issuer, "DrivingLicence").await.unwrap();

    let_assert!(CredentialFormat::MsoMdoc { doctype, claims } = &result.issuer_metadata.format);
    assert_eq!(doctype, "org.iso.18013.5.1.mDL");
    assert!(claims.as_ref().unwrap()["org.iso.18013.5.1"].is_object());
    assert_eq!(result.issuer_metadata.scope, "openid");
    assert!(result.proof_signing_algorithms().is_empty());
}

#[tokio::test]
async fn test_resolve_uses_cache_for_same_issuer() {
    // given
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    mount_document(&mock_server, issuer_document(&issuer), 1).await;
    let service = setup_service();

    // when
    let first = service.resolve(&issuer, "UniversityDegree").await.unwrap();
    let second = service.clone().resolve(&issuer, "UniversityDegree").await.unwrap();
    let other_configuration = service.resolve(&issuer, "DrivingLicence").await.unwrap();

    // then
    assert_eq!(first.issuer_metadata, second.issuer_metadata);
    assert!(Arc::ptr_eq(&first.raw, &other_configuration.raw));
    let_assert!(CredentialFormat::MsoMdoc { .. } = other_configuration.issuer_metadata.format);
}

#[tokio::test]
async fn test_resolve_new_issuer_evicts_previous_entry() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;
    mount_document(&first_server, issuer_document(&first_server.uri()), 2).await;
    mount_document(&second_server, issuer_document(&second_server.uri()), 1).await;
    let service = setup_service();

    service
        .resolve(&first_server.uri(), "UniversityDegree")
        .await
        .unwrap();
    service
        .resolve(&second_server.uri(), "UniversityDegree")
        .await
        .unwrap();
    service
        .resolve(&first_server.uri(), "UniversityDegree")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resolve_failures() {
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    // failed resolutions are not cached
    mount_document(&mock_server, issuer_document(&issuer), 3).await;
    let service = setup_service();

    let_assert!(
        Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::ConfigurationNotFound(id))) =
            service.resolve(&issuer, "Unknown").await
    );
    assert_eq!(id, "Unknown");

    let_assert!(
        Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::UnsupportedFormat(format))) =
            service.resolve(&issuer, "Sdjwt").await
    );
    assert_eq!(format, "vc+sd-jwt");

    let_assert!(
        Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::MissingDoctype)) =
            service.resolve(&issuer, "BlankDoctype").await
    );
}

#[tokio::test]
async fn test_resolve_missing_credential_endpoint() {
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    let mut document = issuer_document(&issuer);
    document
        .as_object_mut()
        .unwrap()
        .remove("credential_endpoint");
    mount_document(&mock_server, document, 1).await;

    let result = setup_service().resolve(&issuer, "UniversityDegree").await;

    let_assert!(
        Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::MissingField(
            "credential_endpoint"
        ))) = result
    );
}

#[tokio::test]
async fn test_resolve_missing_configurations() {
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    mount_document(
        &mock_server,
        json!({"credential_issuer": issuer, "credential_endpoint": "https://x"}),
        1,
    )
    .await;

    let result = setup_service().resolve(&issuer, "UniversityDegree").await;

    let_assert!(
        Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::MissingField(
            "credential_configurations_supported"
        ))) = result
    );
}

#[tokio::test]
async fn test_resolve_empty_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = setup_service()
        .resolve(&mock_server.uri(), "UniversityDegree")
        .await;

    let_assert!(Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::EmptyResponse)) = result);
}

#[tokio::test]
async fn test_resolve_server_error_is_metadata_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = setup_service()
        .resolve(&mock_server.uri(), "UniversityDegree")
        .await;

    let_assert!(Err(VCIClientError::IssuerMetadataFetch(IssuerMetadataError::Transport(_))) = result);
}

#[tokio::test]
async fn test_resolve_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(issuer_document(&mock_server.uri()))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;
    let service = IssuerMetadataService::new(
        Arc::new(ReqwestClient::default()),
        Arc::new(VCIClientConfig {
            network_timeout: Duration::from_millis(50),
            ..Default::default()
        }),
    );

    let result = service.resolve(&mock_server.uri(), "UniversityDegree").await;

    let_assert!(Err(VCIClientError::NetworkRequestTimeout(_)) = result);
}

#[tokio::test]
async fn test_issuer_display_defaults_to_single_empty_entry() {
    let mock_server = MockServer::start().await;
    let issuer = mock_server.uri();
    let mut document = issuer_document(&issuer);
    document.as_object_mut().unwrap().remove("display");
    mount_document(&mock_server, document, 1).await;

    let result = setup_service()
        .resolve(&issuer, "UniversityDegree")
        .await
        .unwrap();

    assert_eq!(result.issuer_display(), json!([{}]));
}
