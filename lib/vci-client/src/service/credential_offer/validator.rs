use super::dto::{CredentialOffer, CredentialOfferGrants};
use crate::error::VCIClientError;

pub(crate) fn validate_credential_offer(offer: &CredentialOffer) -> Result<(), VCIClientError> {
    validate_credential_issuer(&offer.credential_issuer)?;
    validate_credential_configuration_ids(&offer.credential_configuration_ids)?;
    if let Some(grants) = &offer.grants {
        validate_grants(grants)?;
    }
    Ok(())
}

fn validate_credential_issuer(issuer: &str) -> Result<(), VCIClientError> {
    if issuer.trim().is_empty() {
        return Err(invalid("credential_issuer must not be blank"));
    }
    if !issuer.starts_with("https://") {
        return Err(invalid("credential_issuer must use HTTPS scheme"));
    }
    Ok(())
}

fn validate_credential_configuration_ids(ids: &[String]) -> Result<(), VCIClientError> {
    if ids.is_empty() {
        return Err(invalid("credential_configuration_ids must not be empty"));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(invalid("credential_configuration_ids must not contain blank values"));
    }
    Ok(())
}

fn validate_grants(grants: &CredentialOfferGrants) -> Result<(), VCIClientError> {
    if grants.pre_authorized_code.is_none() && grants.authorization_code.is_none() {
        return Err(invalid("grants must contain at least one supported grant type"));
    }

    if let Some(grant) = &grants.pre_authorized_code {
        if grant.pre_authorized_code.trim().is_empty() {
            return Err(invalid("pre-authorized_code must not be blank"));
        }
        if grant
            .tx_code
            .as_ref()
            .and_then(|tx_code| tx_code.length)
            .is_some_and(|length| length <= 0)
        {
            return Err(invalid("tx_code.length must be greater than 0"));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> VCIClientError {
    VCIClientError::OfferFetchFailed(message.to_string())
}
