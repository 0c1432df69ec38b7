//! HS256 JSON Web Tokens implementing `CredentialService`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use domains::{CredentialClaims, CredentialService, DomainError, DomainResult, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

pub struct JwtCredentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCredentials {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }
}

impl CredentialService for JwtCredentials {
    fn issue(&self, user_id: UserId, email: &str) -> DomainResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            DomainError::internal("token signing failed")
        })
    }

    fn verify(&self, token: &str) -> DomainResult<CredentialClaims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            DomainError::Unauthorized("Invalid or expired token".to_string())
        })?;
        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| DomainError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(CredentialClaims {
            user_id,
            email: data.claims.email,
        })
    }
}
