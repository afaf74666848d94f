use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Role, User};

/// Bumped whenever the claim layout changes; older tokens stop verifying
pub const CLAIMS_VERSION: u8 = 1;

/// Longest token lifetime accepted from configuration (ten years)
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// Verified token payload. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub ver: u8,
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token expiry must be between 1 and {max} hours, got {0}", max = MAX_EXPIRY_HOURS)]
    InvalidExpiry(u64),
}

/// Signs and verifies bearer tokens with a shared HS256 secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        if expiry_hours == 0 || expiry_hours > MAX_EXPIRY_HOURS {
            return Err(TokenError::InvalidExpiry(expiry_hours));
        }
        let expiry = Duration::try_hours(expiry_hours as i64)
            .ok_or(TokenError::InvalidExpiry(expiry_hours))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    /// Build claims for a user, valid from now for the configured expiry
    pub fn claims_for(&self, user: &User) -> Claims {
        let now = Utc::now();
        let exp = (now + self.expiry).timestamp();

        Claims {
            ver: CLAIMS_VERSION,
            subject_id: user.id,
            role: user.role,
            email: Some(user.email.clone()),
            external_token: Some(user.external_token.clone()),
            name: Some(user.name.clone()),
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.encode(&self.claims_for(user))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature, expiry and shape. Every failure collapses to `InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            TokenError::InvalidToken
        })?;

        if data.claims.ver != CLAIMS_VERSION {
            tracing::debug!("Token rejected: claims version {}", data.claims.ver);
            return Err(TokenError::InvalidToken);
        }

        Ok(data.claims)
    }
}
