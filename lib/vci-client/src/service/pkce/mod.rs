use vci_crypto::Hasher;
use vci_crypto::hasher::sha256::SHA256;
use vci_crypto::utilities::generate_random_base64url;

use crate::error::VCIClientError;

/// One-time secrets of a single authorization-code attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PkceSession {
    pub code_verifier: String,
    /// `BASE64URL(SHA256(code_verifier))`, unpadded
    pub code_challenge: String,
    pub state: String,
    pub nonce: String,
}

impl PkceSession {
    pub fn generate() -> Result<Self, VCIClientError> {
        Self::generate_with(&SHA256)
    }

    pub(crate) fn generate_with(hasher: &dyn Hasher) -> Result<Self, VCIClientError> {
        // 32 bytes encode to 43 characters, the minimum verifier length of RFC 7636
        let code_verifier = generate_random_base64url::<32>();
        let code_challenge = hasher
            .hash_base64_url(code_verifier.as_bytes())
            .map_err(|error| VCIClientError::Unknown(format!("PKCE challenge: {error}")))?;

        Ok(Self {
            code_verifier,
            code_challenge,
            state: generate_random_base64url::<16>(),
            nonce: generate_random_base64url::<16>(),
        })
    }
}
