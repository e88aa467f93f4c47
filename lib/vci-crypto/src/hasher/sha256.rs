use sha2::{Digest, Sha256};

use super::{Hasher, HasherError};

pub struct SHA256;

impl Hasher for SHA256 {
    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError> {
        let mut hasher = Sha256::new();
        hasher.update(input);
        Ok(hasher.finalize().to_vec())
    }
}
