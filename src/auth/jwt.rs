use jsonwebtoken::{decode, DecodingKey, Validation};

use super::claims::SessionClaims;

/// Read the claims of a session token without checking its signature.
///
/// The client holds no key material; the backend verifies every request.
/// This is only used to show who is signed in and when the token lapses.
pub fn decode_unverified(token: &str) -> Result<SessionClaims, String> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| format!("Failed to decode JWT header: {}", e))?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| format!("Failed to decode JWT claims: {}", e))?;

    Ok(token_data.claims)
}
