use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use weather_db::UserRow;

use crate::error::AppError;
use crate::state::AppState;

/// Access token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub exp: u64,
}

/// Verifies HS256 access tokens signed with the shared secret
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserRow,
}

/// Axum extractor that validates the bearer token and returns an [`AuthUser`].
///
/// The user named by the token must still exist and be active.
///
/// ```ignore
/// async fn my_handler(user: AuthUser, ...) -> Result<..., AppError> { ... }
/// ```
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized("Access token is required"))?;

        let claims = state.jwt.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            AppError::Unauthorized("Invalid or expired token")
        })?;

        match weather_db::users::find_by_id(&state.pool, claims.user_id).await? {
            Some(user) if user.is_active => Ok(AuthUser { user }),
            _ => Err(AppError::Unauthorized("User not found or deactivated")),
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: u64) -> String {
        let claims = Claims {
            user_id: Uuid::nil(),
            email: "ada@example.com".into(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = JwtVerifier::new("secret");
        let claims = verifier.verify(&token("secret", in_one_hour())).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.user_id, Uuid::nil());
    }

    #[test]
    fn test_reject_wrong_secret() {
        let verifier = JwtVerifier::new("secret");
        assert!(verifier.verify(&token("other", in_one_hour())).is_err());
    }

    #[test]
    fn test_reject_expired_token() {
        let verifier = JwtVerifier::new("secret");
        let expired = (chrono::Utc::now().timestamp() - 3600) as u64;
        assert!(verifier.verify(&token("secret", expired)).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let parts = |value: &str| {
            Request::builder()
                .header(AUTHORIZATION, value)
                .body(())
                .unwrap()
                .into_parts()
                .0
        };
        assert_eq!(bearer_token(&parts("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&parts("Basic abc")), None);
        assert_eq!(bearer_token(&parts("Bearer ")), None);

        let (no_header, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(bearer_token(&no_header), None);
    }
}
