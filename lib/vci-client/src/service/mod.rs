pub mod authorization_server;
pub mod credential_offer;
pub mod credential_request;
pub mod flow;
pub mod issuer_metadata;
pub mod pkce;
pub mod token;
pub mod trusted_issuer;
