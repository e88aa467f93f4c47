use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert2::let_assert;
use futures::FutureExt;
use serde_json::{Value, json};
use vci_crypto::Hasher;
use vci_crypto::hasher::sha256::SHA256;

use super::FlowService;
use super::dto::{CheckIssuerTrustFn, OfferFlowCallbacks, TrustedIssuerFlowCallbacks, TxCodeFn};
use crate::config::VCIClientConfig;
use crate::error::VCIClientError;
use crate::model::credential::ClientMetadata;
use crate::model::grant::GrantType;
use crate::provider::http_client::{
    HttpClient, Method, MockHttpClient, Request, Response, StatusCode,
};
use crate::provider::secure_storage::InMemorySecureStorage;
use crate::service::authorization_server::AuthorizationServerService;
use crate::service::credential_offer::CredentialOfferService;
use crate::service::credential_offer::dto::TxCodeInputMode;
use crate::service::credential_request::CredentialRequestService;
use crate::service::issuer_metadata::IssuerMetadataService;
use crate::service::token::TokenService;
use crate::service::token::dto::{TokenRequest, TokenResponse};
use crate::service::trusted_issuer::TrustedIssuerRegistry;

const ISSUER: &str = "https://issuer.example.com";
const AUTH_SERVER: &str = "https://auth.example.com";
const ISSUER_METADATA_URL: &str =
    "https://issuer.example.com/.well-known/openid-credential-issuer";
const AUTH_SERVER_METADATA_URL: &str =
    "https://auth.example.com/.well-known/oauth-authorization-server";
const CREDENTIAL_URL: &str = "https://issuer.example.com/credential";

type Routes = HashMap<String, (u16, String)>;
type Recorded = Arc<Mutex<Vec<Request>>>;

fn issuer_document() -> Value {
    json!({
        "credential_issuer": ISSUER,
        "credential_endpoint": CREDENTIAL_URL,
        "token_endpoint": "https://issuer.example.com/token",
        "authorization_servers": [AUTH_SERVER],
        "display": [{"name": "Example University", "locale": "en"}],
        "credential_configurations_supported": {
            "UniversityDegree": {
                "format": "ldp_vc",
                "scope": "degree",
                "credential_definition": {
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                },
                "proof_types_supported": {
                    "jwt": {"proof_signing_alg_values_supported": ["ES256"]}
                }
            }
        }
    })
}

fn auth_server_document() -> Value {
    json!({
        "issuer": AUTH_SERVER,
        "authorization_endpoint": "https://auth.example.com/authorize",
        "token_endpoint": "https://auth.example.com/token",
        "grant_types_supported": ["authorization_code", "urn:ietf:params:oauth:grant-type:pre-authorized_code"]
    })
}

fn default_routes() -> Routes {
    HashMap::from([
        (
            ISSUER_METADATA_URL.to_string(),
            (200, issuer_document().to_string()),
        ),
        (
            AUTH_SERVER_METADATA_URL.to_string(),
            (200, auth_server_document().to_string()),
        ),
        (
            CREDENTIAL_URL.to_string(),
            (
                200,
                json!({"credential": {"type": ["VerifiableCredential"], "proof": {}}}).to_string(),
            ),
        ),
    ])
}

fn routing_client(routes: Routes, recorded: Recorded) -> MockHttpClient {
    let mut client = MockHttpClient::new();
    client
        .expect_send()
        .returning(move |url, body, headers, method, _| {
            let request = Request {
                body,
                headers: headers.unwrap_or_default(),
                method,
                url: url.to_string(),
            };
            recorded.lock().unwrap().push(request.clone());

            let (status, body) = routes.get(url).cloned().unwrap_or((404, String::new()));
            Ok(Response {
                body: body.into_bytes(),
                headers: Default::default(),
                status: StatusCode(status),
                request,
            })
        });
    client
}

fn setup_flow(http_client: MockHttpClient) -> (FlowService, TrustedIssuerRegistry) {
    let http_client: Arc<dyn HttpClient> = Arc::new(http_client);
    let config = Arc::new(VCIClientConfig::default());
    let registry = TrustedIssuerRegistry::new(
        Arc::new(InMemorySecureStorage::default()),
        config.trusted_issuers_storage_key.to_owned(),
    );

    let flow = FlowService::new(
        CredentialOfferService::new(http_client.clone(), config.clone()),
        IssuerMetadataService::new(http_client.clone(), config.clone()),
        AuthorizationServerService::new(http_client.clone(), config.clone()),
        TokenService,
        CredentialRequestService::new(http_client, config),
        registry.clone(),
    );
    (flow, registry)
}

fn client_metadata() -> ClientMetadata {
    ClientMetadata {
        client_id: "wallet-client".to_string(),
        redirect_uri: "io.wallet://callback".to_string(),
    }
}

fn offer_url(offer: Value) -> String {
    format!(
        "openid-credential-offer://?credential_offer={}",
        urlencoding::encode(&offer.to_string())
    )
}

fn pre_authorized_offer(tx_code: Option<Value>) -> String {
    let mut grant = json!({"pre-authorized_code": "pre-auth-code"});
    if let Some(tx_code) = tx_code {
        grant["tx_code"] = tx_code;
    }
    offer_url(json!({
        "credential_issuer": ISSUER,
        "credential_configuration_ids": ["UniversityDegree"],
        "grants": {"urn:ietf:params:oauth:grant-type:pre-authorized_code": grant}
    }))
}

#[derive(Default)]
struct Calls {
    authorization_urls: Mutex<Vec<String>>,
    tx_code: Mutex<Vec<(Option<TxCodeInputMode>, Option<String>, Option<i64>)>>,
    token_requests: Mutex<Vec<TokenRequest>>,
    proofs: Mutex<Vec<(String, Option<String>, Vec<String>)>>,
    trust_checks: Mutex<Vec<(String, Value)>>,
}

fn tx_code_callback(calls: Arc<Calls>) -> TxCodeFn {
    Arc::new(move |input_mode, description, length| {
        calls
            .tx_code
            .lock()
            .unwrap()
            .push((input_mode, description, length));
        async { anyhow::Ok("123456".to_string()) }.boxed()
    })
}

fn offer_callbacks(calls: Arc<Calls>, trust: Option<bool>) -> OfferFlowCallbacks {
    let authorize_calls = calls.clone();
    let token_calls = calls.clone();
    let proof_calls = calls.clone();
    let trust_calls = calls.clone();

    OfferFlowCallbacks {
        authorize_user: Arc::new(move |url| {
            authorize_calls.authorization_urls.lock().unwrap().push(url);
            async { anyhow::Ok("auth-code".to_string()) }.boxed()
        }),
        get_token_response: Arc::new(move |request| {
            token_calls.token_requests.lock().unwrap().push(request);
            async {
                anyhow::Ok(TokenResponse {
                    access_token: "access-token".to_string(),
                    token_type: "Bearer".to_string(),
                    expires_in: Some(300),
                    c_nonce: Some("c-nonce".to_string()),
                    c_nonce_expires_in: None,
                })
            }
            .boxed()
        }),
        get_proof_jwt: Arc::new(move |issuer, c_nonce, algorithms| {
            proof_calls
                .proofs
                .lock()
                .unwrap()
                .push((issuer, c_nonce, algorithms));
            async { anyhow::Ok("header.payload.signature".to_string()) }.boxed()
        }),
        get_tx_code: Some(tx_code_callback(calls)),
        check_issuer_trust: trust.map(|consent| -> CheckIssuerTrustFn {
            Arc::new(move |issuer, display| {
                trust_calls.trust_checks.lock().unwrap().push((issuer, display));
                async move { anyhow::Ok(consent) }.boxed()
            })
        }),
    }
}

fn credential_request(recorded: &Recorded) -> Request {
    let_assert!(
        Some(request) = recorded
            .lock()
            .unwrap()
            .iter()
            .find(|request| request.url == CREDENTIAL_URL)
            .cloned()
    );
    request
}

#[tokio::test]
async fn test_pre_authorized_offer_without_tx_code() {
    // given
    let recorded = Recorded::default();
    let (flow, _) = setup_flow(routing_client(default_routes(), recorded.clone()));
    let calls = Arc::new(Calls::default());

    // when
    let response = flow
        .download_by_offer(
            &pre_authorized_offer(None),
            &client_metadata(),
            &offer_callbacks(calls.clone(), None),
            None,
        )
        .await
        .unwrap();

    // then
    assert_eq!(response.credential_configuration_id, "UniversityDegree");
    assert_eq!(response.credential_issuer, ISSUER);
    assert_eq!(response.credential["type"], json!(["VerifiableCredential"]));

    assert!(calls.tx_code.lock().unwrap().is_empty());
    assert!(calls.authorization_urls.lock().unwrap().is_empty());

    let token_requests = calls.token_requests.lock().unwrap();
    assert_eq!(token_requests.len(), 1);
    assert_eq!(token_requests[0].grant_type, GrantType::PreAuthorizedCode);
    assert_eq!(token_requests[0].token_endpoint, "https://auth.example.com/token");
    assert_eq!(token_requests[0].pre_authorized_code.as_deref(), Some("pre-auth-code"));
    assert!(token_requests[0].tx_code.is_none());

    assert_eq!(
        *calls.proofs.lock().unwrap(),
        vec![(
            ISSUER.to_string(),
            Some("c-nonce".to_string()),
            vec!["ES256".to_string()]
        )]
    );

    let request = credential_request(&recorded);
    assert_eq!(request.method, Method::Post);
    assert_eq!(
        request.headers.get("Authorization").map(String::as_str),
        Some("Bearer access-token")
    );
    let body: Value = serde_json::from_slice(&request.body.unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "format": "ldp_vc",
            "credential_definition": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential", "UniversityDegreeCredential"]
            },
            "proof": {"proof_type": "jwt", "jwt": "header.payload.signature"}
        })
    );
}

#[tokio::test]
async fn test_pre_authorized_offer_with_tx_code() {
    let (flow, _) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let calls = Arc::new(Calls::default());
    let offer = pre_authorized_offer(Some(json!({
        "input_mode": "numeric",
        "length": 6,
        "description": "Code sent by email"
    })));

    flow.download_by_offer(
        &offer,
        &client_metadata(),
        &offer_callbacks(calls.clone(), None),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        *calls.tx_code.lock().unwrap(),
        vec![(
            Some(TxCodeInputMode::Numeric),
            Some("Code sent by email".to_string()),
            Some(6)
        )]
    );
    assert_eq!(
        calls.token_requests.lock().unwrap()[0].tx_code.as_deref(),
        Some("123456")
    );
}

#[tokio::test]
async fn test_pre_authorized_offer_tx_code_without_provider() {
    let (flow, _) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let calls = Arc::new(Calls::default());
    let callbacks = OfferFlowCallbacks {
        get_tx_code: None,
        ..offer_callbacks(calls.clone(), None)
    };

    let result = flow
        .download_by_offer(
            &pre_authorized_offer(Some(json!({"length": 4}))),
            &client_metadata(),
            &callbacks,
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::DownloadFailed(message)) = result);
    assert!(message.contains("tx_code required"));
    assert!(calls.token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_offer_is_rejected_without_network() {
    let mut http_client = MockHttpClient::new();
    http_client.expect_send().never();
    let (flow, _) = setup_flow(http_client);
    let offer = offer_url(json!({
        "credential_issuer": ISSUER,
        "credential_configuration_ids": ["UniversityDegree", "DrivingLicence"],
        "grants": {"urn:ietf:params:oauth:grant-type:pre-authorized_code": {"pre-authorized_code": "code"}}
    }));

    let result = flow
        .download_by_offer(
            &offer,
            &client_metadata(),
            &offer_callbacks(Arc::new(Calls::default()), None),
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::DownloadFailed(message)) = result);
    assert!(message.contains("Batch credential request is not supported"));
}

#[tokio::test]
async fn test_authorization_code_offer() {
    // given
    let (flow, _) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let calls = Arc::new(Calls::default());
    let offer = offer_url(json!({
        "credential_issuer": ISSUER,
        "credential_configuration_ids": ["UniversityDegree"],
        "grants": {"authorization_code": {"issuer_state": "issuer-state-123"}}
    }));

    // when
    flow.download_by_offer(
        &offer,
        &client_metadata(),
        &offer_callbacks(calls.clone(), None),
        None,
    )
    .await
    .unwrap();

    // then
    let authorization_urls = calls.authorization_urls.lock().unwrap();
    assert_eq!(authorization_urls.len(), 1);
    let url = url::Url::parse(&authorization_urls[0]).unwrap();
    assert!(url.as_str().starts_with("https://auth.example.com/authorize?"));
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "wallet-client");
    assert_eq!(params["redirect_uri"], "io.wallet://callback");
    assert_eq!(params["scope"], "openid degree");
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["issuer_state"], "issuer-state-123");
    assert!(!params["state"].is_empty());
    assert!(!params["nonce"].is_empty());

    let token_requests = calls.token_requests.lock().unwrap();
    let request = &token_requests[0];
    assert_eq!(request.grant_type, GrantType::AuthorizationCode);
    // the issuer's own token endpoint wins for this grant
    assert_eq!(request.token_endpoint, "https://issuer.example.com/token");
    assert_eq!(request.authorization_code.as_deref(), Some("auth-code"));
    assert_eq!(request.client_id.as_deref(), Some("wallet-client"));
    assert_eq!(request.redirect_uri.as_deref(), Some("io.wallet://callback"));
    let_assert!(Some(code_verifier) = &request.code_verifier);
    assert_eq!(
        SHA256.hash_base64_url(code_verifier.as_bytes()).unwrap(),
        params["code_challenge"]
    );
}

#[tokio::test]
async fn test_trust_refused() {
    let (flow, registry) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let calls = Arc::new(Calls::default());

    let result = flow
        .download_by_offer(
            &pre_authorized_offer(None),
            &client_metadata(),
            &offer_callbacks(calls.clone(), Some(false)),
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::IssuerUntrusted(_)) = result);
    assert_eq!(
        *calls.trust_checks.lock().unwrap(),
        vec![(
            ISSUER.to_string(),
            json!([{"name": "Example University", "locale": "en"}])
        )]
    );
    assert!(calls.token_requests.lock().unwrap().is_empty());
    assert!(!registry.is_trusted(ISSUER).await);
}

#[tokio::test]
async fn test_trust_consent_is_remembered() {
    let (flow, registry) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let calls = Arc::new(Calls::default());
    let callbacks = offer_callbacks(calls.clone(), Some(true));

    for _ in 0..2 {
        flow.download_by_offer(&pre_authorized_offer(None), &client_metadata(), &callbacks, None)
            .await
            .unwrap();
    }

    assert!(registry.is_trusted(ISSUER).await);
    assert_eq!(calls.trust_checks.lock().unwrap().len(), 1);
    assert_eq!(calls.token_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_without_trust_callback_registry_is_untouched() {
    let (flow, registry) = setup_flow(routing_client(default_routes(), Recorded::default()));

    flow.download_by_offer(
        &pre_authorized_offer(None),
        &client_metadata(),
        &offer_callbacks(Arc::new(Calls::default()), None),
        None,
    )
    .await
    .unwrap();

    assert!(!registry.is_trusted(ISSUER).await);
}

#[tokio::test]
async fn test_empty_credential_response_is_failure() {
    let mut routes = default_routes();
    routes.insert(CREDENTIAL_URL.to_string(), (200, String::new()));
    let (flow, _) = setup_flow(routing_client(routes, Recorded::default()));

    let result = flow
        .download_by_offer(
            &pre_authorized_offer(None),
            &client_metadata(),
            &offer_callbacks(Arc::new(Calls::default()), None),
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::DownloadFailed(message)) = result);
    assert!(message.starts_with("Credential request: "));
}

#[tokio::test]
async fn test_credential_endpoint_error_text_is_surfaced() {
    let mut routes = default_routes();
    routes.insert(
        CREDENTIAL_URL.to_string(),
        (400, r#"{"error":"invalid_proof"}"#.to_string()),
    );
    let (flow, _) = setup_flow(routing_client(routes, Recorded::default()));

    let result = flow
        .download_by_offer(
            &pre_authorized_offer(None),
            &client_metadata(),
            &offer_callbacks(Arc::new(Calls::default()), None),
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::DownloadFailed(message)) = result);
    assert!(message.contains("invalid_proof"));
}

#[tokio::test]
async fn test_foreign_callback_failure_is_unknown_with_stage() {
    let (flow, _) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let callbacks = OfferFlowCallbacks {
        get_token_response: Arc::new(|_| {
            async { Err::<TokenResponse, _>(anyhow::anyhow!("user closed the app")) }.boxed()
        }),
        ..offer_callbacks(Arc::new(Calls::default()), None)
    };

    let result = flow
        .download_by_offer(&pre_authorized_offer(None), &client_metadata(), &callbacks, None)
        .await;

    let_assert!(Err(VCIClientError::Unknown(message)) = result);
    assert_eq!(message, "Token acquisition: user closed the app");
}

#[tokio::test]
async fn test_missing_configuration_is_metadata_failure() {
    let (flow, _) = setup_flow(routing_client(default_routes(), Recorded::default()));
    let offer = offer_url(json!({
        "credential_issuer": ISSUER,
        "credential_configuration_ids": ["Unknown"],
        "grants": {"urn:ietf:params:oauth:grant-type:pre-authorized_code": {"pre-authorized_code": "code"}}
    }));

    let result = flow
        .download_by_offer(
            &offer,
            &client_metadata(),
            &offer_callbacks(Arc::new(Calls::default()), None),
            None,
        )
        .await;

    let_assert!(Err(VCIClientError::IssuerMetadataFetch(_)) = result);
}

#[tokio::test]
async fn test_download_from_trusted_issuer() {
    // given
    let recorded = Recorded::default();
    let (flow, _) = setup_flow(routing_client(default_routes(), recorded.clone()));
    let calls = Arc::new(Calls::default());
    let offer_callbacks = offer_callbacks(calls.clone(), None);
    let callbacks = TrustedIssuerFlowCallbacks {
        authorize_user: offer_callbacks.authorize_user,
        get_token_response: offer_callbacks.get_token_response,
        get_proof_jwt: offer_callbacks.get_proof_jwt,
    };

    // when
    let response = flow
        .download_from_trusted_issuer(
            ISSUER,
            "UniversityDegree",
            &client_metadata(),
            &callbacks,
            None,
        )
        .await
        .unwrap();

    // then
    assert_eq!(response.credential_issuer, ISSUER);
    assert_eq!(calls.authorization_urls.lock().unwrap().len(), 1);
    assert_eq!(
        calls.token_requests.lock().unwrap()[0].grant_type,
        GrantType::AuthorizationCode
    );
    let urls: Vec<String> = recorded
        .lock()
        .unwrap()
        .iter()
        .map(|request| request.url.to_owned())
        .collect();
    assert_eq!(
        urls,
        vec![ISSUER_METADATA_URL, AUTH_SERVER_METADATA_URL, CREDENTIAL_URL]
    );
}
