//! JWT Token Service
//! Mission: Issue and verify signed, expiring bearer tokens bound to a user id

use crate::auth::models::{Claims, TokenUser};
use crate::error::AuthError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Stateless token issuer/verifier keyed by the server secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service. An empty secret is a configuration error.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Fatal("JWT secret is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, valid from now for the configured TTL
    pub fn issue(&self, user_id: &Uuid) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`
    pub fn issue_at(&self, user_id: &Uuid, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|_| AuthError::Fatal("token TTL out of range".to_string()))?;
        let iat = issued_at.timestamp().max(0);
        let exp = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Fatal("token expiry overflow".to_string()))?
            .timestamp()
            .max(0);

        let claims = Claims {
            user: TokenUser {
                id: user_id.to_string(),
            },
            iat: iat as usize,
            exp: exp as usize,
        };

        debug!(
            "Issuing JWT for user {}, expires in {}s",
            user_id,
            self.ttl.as_secs()
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Fatal(format!("Failed to sign JWT: {e}")))
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// Expired and tampered tokens both surface as `InvalidToken`; only the log
    /// line tells them apart.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => debug!("Rejected expired JWT"),
                ErrorKind::InvalidSignature => warn!("Rejected JWT with bad signature"),
                other => debug!("Rejected malformed JWT: {:?}", other),
            }
            AuthError::InvalidToken
        })?;

        Uuid::parse_str(&decoded.claims.user.id).map_err(|_| {
            warn!("Rejected JWT with malformed subject");
            AuthError::InvalidToken
        })
    }
}
