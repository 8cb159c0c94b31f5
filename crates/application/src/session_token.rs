//! Signed session tokens carried in the `kiwiSid` cookie.
//!
//! Tokens are compact HS512 JWTs with claims
//! `{iat, jti, iss, nbf, exp, data: {xsrfToken, userId?}}`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::SessionData;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Token lifetime used when none is configured: one year.
pub const DEFAULT_SESSION_LIFETIME_SECONDS: i64 = 31_536_000;

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    iat: i64,
    jti: String,
    iss: String,
    nbf: i64,
    exp: i64,
    data: SessionData,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_seconds: i64,
}

impl std::fmt::Debug for SessionTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenCodec")
            .field("secret", &"<redacted>")
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish()
    }
}

impl SessionTokenCodec {
    /// Creates a codec with the signing secret and token lifetime.
    pub fn new(secret: impl Into<Vec<u8>>, lifetime_seconds: i64) -> AppResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if lifetime_seconds <= 0 {
            return Err(AppError::Validation(
                "session lifetime must be positive".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            lifetime_seconds,
        })
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    /// Signs a token for the session data.
    pub fn issue(&self, issuer: &str, data: &SessionData, now: DateTime<Utc>) -> AppResult<String> {
        let issued_at = now.timestamp();
        let claims = SessionClaims {
            iat: issued_at,
            jti: generate_token_id()?,
            iss: issuer.to_owned(),
            nbf: issued_at,
            exp: issued_at.saturating_add(self.lifetime_seconds),
            data: data.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign session token: {error}")))
    }

    /// Verifies a token and returns its session data.
    ///
    /// Every failure yields `None`; callers treat the request as anonymous.
    #[must_use]
    pub fn parse(&self, token: &str, now: DateTime<Utc>) -> Option<SessionData> {
        match self.verify(token, now) {
            Ok(claims) => Some(claims.data),
            Err(reason) => {
                tracing::debug!(%reason, "rejected session token");
                None
            }
        }
    }

    /// Checks signature, algorithm and time claims. The time window is
    /// enforced against both the system clock and `now`.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, String> {
        let claims = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|error| error.to_string())?
        .claims;

        let now = now.timestamp();
        if claims.nbf > now {
            return Err("token not yet valid".to_owned());
        }
        if now >= claims.exp {
            return Err("token expired".to_owned());
        }

        Ok(claims)
    }
}

fn generate_token_id() -> AppResult<String> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate token id: {error}")))?;
    Ok(STANDARD.encode(bytes))
}
