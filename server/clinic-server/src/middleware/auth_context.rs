//! Authentication context extraction
//!
//! Handlers take an [`AuthContext`] argument; the extractor verifies the
//! bearer token, re-loads the account and hands the policy layer an
//! [`Identity`]. A request without valid credentials is rejected with 401
//! before any handler code runs.

use async_trait::async_trait;
use auth_policy::Identity;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use chrono::{Duration, Utc};
use database_layer::models::{Role, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::server::ClinicServer;

/// JWT claims carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::minutes(lifetime_minutes),
        }
    }

    /// Mint an access token for an account.
    pub fn issue(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::authentication("Invalid or expired token")
            })
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.identity.user_id
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    ClinicServer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let server = ClinicServer::from_ref(state);
        let token = extract_token(parts)?;
        let claims = server.jwt.verify(token)?;

        // Deleted or deactivated accounts lose access even with a live token.
        let user = server
            .repos
            .users
            .get(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "Token for unknown or inactive account");
                ApiError::authentication("Account is not active")
            })?;

        if user.role != claims.role {
            warn!(user_id = %user.id, "Token role no longer matches the account");
            return Err(ApiError::authentication("Token is out of date, sign in again"));
        }

        Ok(AuthContext {
            identity: Identity::from_user(&user),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let keys = JwtKeys::new("test-secret", 60);
        let user = User::new("wanjiku", Role::Nurse);

        let token = keys.issue(&user).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Nurse);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let ours = JwtKeys::new("ours", 60);
        let theirs = JwtKeys::new("theirs", 60);
        let token = theirs.issue(&User::new("mallory", Role::Admin)).unwrap();

        assert!(matches!(ours.verify(&token), Err(ApiError::Authentication { .. })));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = JwtKeys::new("test-secret", -10);
        let token = keys.issue(&User::new("otieno", Role::Doctor)).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
