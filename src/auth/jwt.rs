use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Reads the claims of a JWT without checking its signature.
///
/// The client cannot verify signatures; this is only used to avoid
/// treating an obviously expired session as signed in. Returns `None` for
/// tokens that are not JWTs.
pub fn peek_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = peek_claims(token)?.exp?;
    Utc.timestamp_opt(exp, 0).single()
}

/// A token is usable when it is non-empty and, if it carries an expiry,
/// that expiry is in the future. Opaque (non-JWT) tokens are accepted.
pub fn is_token_usable(token: &str, now: DateTime<Utc>) -> bool {
    if token.trim().is_empty() {
        return false;
    }
    match expires_at(token) {
        Some(expiry) => expiry > now,
        None => true,
    }
}

#[cfg(test)]
pub(crate) fn make_test_token(exp: DateTime<Utc>) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: Some("6f1c1c2e-8f0e-4b59-9f41-5a4f2b1f8a10".into()),
        email: Some("ada@example.com".into()),
        exp: Some(exp.timestamp()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .unwrap()
}
