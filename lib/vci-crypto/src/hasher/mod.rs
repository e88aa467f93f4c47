use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use thiserror::Error;

pub mod sha256;


#[derive(Debug, Error)]
pub enum HasherError {
    #[error("Encoding error: `{0}`")]
    Encoding(#[from] ct_codecs::Error),
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Hasher: Send + Sync {
    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError>;

    /// Unpadded URL-safe base64 of the digest, the form used for PKCE challenges
    fn hash_base64_url(&self, input: &[u8]) -> Result<String, HasherError> {
        let digest = self.hash(input)?;
        Ok(Base64UrlSafeNoPadding::encode_to_string(digest)?)
    }
}
