use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;
use tracing::debug;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization credential is empty or malformed")]
    MalformedCredential,
    #[error("invalid bearer token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies webhook bearer tokens signed with a shared HMAC key.
///
/// ```
/// use security::BearerAuthorizer;
///
/// let auth = BearerAuthorizer::from_secret("signing-key");
/// let token = auth.sign(&serde_json::json!({ "sub": "phone-1" })).unwrap();
/// assert!(auth.is_authorized(&format!("Bearer {token}")));
/// assert!(!auth.is_authorized("Bearer not-a-jwt"));
/// ```
#[derive(Clone)]
pub struct BearerAuthorizer {
    key: Vec<u8>,
}

impl fmt::Debug for BearerAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthorizer").finish_non_exhaustive()
    }
}

impl BearerAuthorizer {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    /// Checks a raw `Authorization` value (`Bearer <jwt>` or a bare `<jwt>`).
    ///
    /// Only HMAC algorithms are accepted. `exp` and `nbf` are enforced when
    /// present but not required.
    pub fn authorize(&self, credential: &str) -> Result<Value, AuthError> {
        let token = extract_token(credential).ok_or(AuthError::MalformedCredential)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let data = decode::<Value>(token, &DecodingKey::from_secret(&self.key), &validation)?;
        Ok(data.claims)
    }

    pub fn is_authorized(&self, credential: &str) -> bool {
        match self.authorize(credential) {
            Ok(_) => true,
            Err(err) => {
                debug!("bearer authorization failed: {err}");
                false
            }
        }
    }

    /// Issues an HS256 token for the configured key.
    pub fn sign(&self, claims: &Value) -> Result<String, AuthError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.key),
        )?)
    }
}

/// Pulls the token out of `Bearer <token>` or a bare `<token>`.
pub fn extract_token(credential: &str) -> Option<&str> {
    let parts: Vec<&str> = credential.trim().split(' ').collect();
    let token = match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => *token,
        [token] => *token,
        _ => return None,
    };
    (!token.is_empty()).then_some(token)
}
