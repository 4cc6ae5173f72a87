use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// JWT claims issued by the platform's auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Platform user id
    pub sub: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub exp: i64,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub scopes: Vec<String>,
}

/// HS256 verification key
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.trim_matches('"').as_bytes()),
            validation,
        }
    }

    /// Validate signature and expiry, returning the caller's identity
    pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::Unauthorized(format!("Invalid JWT token: {}", e))
        })?;

        if token_data.claims.sub.is_empty() {
            return Err(ApiError::Unauthorized("JWT has no subject".to_string()));
        }

        Ok(Principal {
            subject: token_data.claims.sub,
            scopes: token_data.claims.scopes,
        })
    }
}

/// Extract JWT token from Authorization header
/// Expected format: "Bearer <token>"
pub fn extract_jwt_from_header(auth_header: Option<&str>) -> Result<&str, ApiError> {
    let auth_value = auth_header.ok_or_else(|| {
        ApiError::Unauthorized("Missing Authorization header".to_string())
    })?;

    auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format, expected 'Bearer <token>'".to_string())
        })
}
