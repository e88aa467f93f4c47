use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::service::credential_offer::dto::TxCodeInputMode;
pub use crate::service::token::dto::TokenResponseFn;

/// Receives the authorization URL, returns the authorization code
pub type AuthorizeUserFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// Receives `input_mode`, `description` and `length` of the offer's tx_code,
/// returns the code entered by the user
pub type TxCodeFn = Arc<
    dyn Fn(
            Option<TxCodeInputMode>,
            Option<String>,
            Option<i64>,
        ) -> BoxFuture<'static, anyhow::Result<String>>
        + Send
        + Sync,
>;

/// Receives `credential_issuer`, `c_nonce` and the signing algorithms supported
/// by the configuration, returns a compact proof JWT
pub type ProofJwtFn = Arc<
    dyn Fn(String, Option<String>, Vec<String>) -> BoxFuture<'static, anyhow::Result<String>>
        + Send
        + Sync,
>;

/// Receives `credential_issuer` and its `display` entries, returns the user's consent
pub type CheckIssuerTrustFn =
    Arc<dyn Fn(String, Value) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

#[derive(Clone)]
pub struct OfferFlowCallbacks {
    pub authorize_user: AuthorizeUserFn,
    pub get_token_response: TokenResponseFn,
    pub get_proof_jwt: ProofJwtFn,
    pub get_tx_code: Option<TxCodeFn>,
    /// Without it, issuers are accepted without asking
    pub check_issuer_trust: Option<CheckIssuerTrustFn>,
}

#[derive(Clone)]
pub struct TrustedIssuerFlowCallbacks {
    pub authorize_user: AuthorizeUserFn,
    pub get_token_response: TokenResponseFn,
    pub get_proof_jwt: ProofJwtFn,
}
