pub mod dto;
pub mod http_exchange;
pub mod service;

/// Builds grant-specific token requests and validates what the host's token
/// exchange returns
#[derive(Clone, Default)]
pub struct TokenService;
