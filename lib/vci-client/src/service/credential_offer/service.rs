use url::Url;

use super::CredentialOfferService;
use super::dto::CredentialOffer;
use super::validator::validate_credential_offer;
use crate::error::VCIClientError;

const CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY: &str = "credential_offer";
const CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY: &str = "credential_offer_uri";

impl CredentialOfferService {
    /// Resolves an offer URL carrying either an inline offer or a reference to one.
    ///
    /// Every failure, including transport failures of the by-reference fetch, is
    /// reported as [`VCIClientError::OfferFetchFailed`].
    pub async fn resolve_credential_offer(
        &self,
        offer_url: &str,
    ) -> Result<CredentialOffer, VCIClientError> {
        let offer = match self.parse_offer_reference(offer_url)? {
            OfferReference::Value(value) => serde_json::from_str(&value).map_err(|error| {
                fetch_failed(format!("Invalid credential offer JSON: {error}"))
            })?,
            OfferReference::Uri(uri) => self.fetch_credential_offer(&uri).await?,
        };

        validate_credential_offer(&offer)?;

        tracing::debug!(
            credential_issuer = %offer.credential_issuer,
            configurations = offer.credential_configuration_ids.len(),
            "Credential offer resolved"
        );
        Ok(offer)
    }

    fn parse_offer_reference(&self, offer_url: &str) -> Result<OfferReference, VCIClientError> {
        // some producers omit the authority: `openid-credential-offer://?credential_offer=...`
        let scheme = &self.config.offer_url_scheme;
        let normalized =
            offer_url.replacen(&format!("{scheme}://?"), &format!("{scheme}://dummy?"), 1);

        let url = Url::parse(&normalized)
            .map_err(|error| fetch_failed(format!("Invalid credential offer URL: {error}")))?;

        let query = url
            .query()
            .filter(|query| !query.is_empty())
            .ok_or_else(|| fetch_failed("No query parameters in the URI"))?;

        let mut value = None;
        let mut reference = None;
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY => value = Some(decode_strict(raw)?),
                CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY => reference = Some(decode_strict(raw)?),
                _ => {}
            }
        }

        match (value, reference) {
            (Some(_), Some(_)) => Err(fetch_failed(format!(
                "Detected both {CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY} and {CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY}"
            ))),
            (Some(value), None) => Ok(OfferReference::Value(value)),
            (None, Some(uri)) => Ok(OfferReference::Uri(uri)),
            (None, None) => Err(fetch_failed(format!(
                "Invalid credential offer URL: must contain '{CREDENTIAL_OFFER_VALUE_QUERY_PARAM_KEY}' or '{CREDENTIAL_OFFER_REFERENCE_QUERY_PARAM_KEY}'"
            ))),
        }
    }

    async fn fetch_credential_offer(&self, uri: &str) -> Result<CredentialOffer, VCIClientError> {
        let response = self
            .http_client
            .get(uri)
            .header("Accept", "application/json")
            .timeout(self.config.network_timeout)
            .send()
            .await
            .map_err(|error| fetch_failed(format!("Error during offer request to {uri}: {error}")))?
            .error_for_status()
            .map_err(|error| fetch_failed(format!("Offer request to {uri} failed: {error}")))?;

        if response.text().is_none() {
            return Err(fetch_failed(format!(
                "Failed to fetch credential offer from {uri}: empty response"
            )));
        }

        response
            .json()
            .map_err(|error| fetch_failed(format!("Invalid credential offer JSON: {error}")))
    }
}

enum OfferReference {
    Value(String),
    Uri(String),
}

/// Form-style percent decoding that rejects truncated or non-hex escapes
fn decode_strict(raw: &str) -> Result<String, VCIClientError> {
    let bytes = raw.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(index, byte)| {
        *byte == b'%'
            && !bytes
                .get(index + 1..index + 3)
                .is_some_and(|escape| escape.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(fetch_failed("Malformed percent-encoding in credential offer"));
    }

    urlencoding::decode(&raw.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|error| fetch_failed(format!("Invalid credential offer encoding: {error}")))
}

fn fetch_failed(message: impl Into<String>) -> VCIClientError {
    VCIClientError::OfferFetchFailed(message.into())
}
