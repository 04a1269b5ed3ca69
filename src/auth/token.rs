use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AuthError};

/// Ten years.
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    #[serde(default)]
    pub iat: i64,     // Issued at
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, algorithm: Algorithm, ttl: Duration) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
            validation,
            ttl,
        }
    }

    pub fn from_settings(config: &AuthConfig) -> Result<Self, AppError> {
        let algorithm = parse_algorithm(&config.jwt_algorithm)?;
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&config.token_expiry_hours) {
            return Err(AppError::ConfigError(format!(
                "JWT expiration must be between 1 and {} hours, got {}",
                MAX_TOKEN_EXPIRY_HOURS, config.token_expiry_hours
            )));
        }
        Ok(Self::new(
            &config.jwt_secret,
            algorithm,
            Duration::hours(config.token_expiry_hours),
        ))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.header.alg
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalError("Token expiry is out of range".into()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign token: {}", e)))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidTokenPayload,
                _ => AuthError::InvalidToken,
            })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidTokenPayload);
        }
        Ok(data.claims)
    }
}

/// Only the HMAC family works with a shared secret.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, AppError> {
    let algorithm = Algorithm::from_str(name)
        .map_err(|_| AppError::ConfigError(format!("Unknown JWT algorithm '{}'", name)))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(AppError::ConfigError(format!(
            "JWT algorithm {:?} needs a key pair; only HS256, HS384 and HS512 are supported",
            other
        ))),
    }
}
