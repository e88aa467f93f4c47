use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut res = [0u8; N];
    get_rng().fill_bytes(&mut res);
    res
}

/// `N` random bytes as unpadded URL-safe base64
pub fn generate_random_base64url<const N: usize>() -> String {
    let seed = generate_random_bytes::<N>();

    //This operation should be safe as we control the input.
    Base64UrlSafeNoPadding::encode_to_string(seed).unwrap_or_default()
}

pub fn get_rng() -> impl RngCore + CryptoRng {
    ChaCha20Rng::from_entropy()
}
