use std::{str::FromStr, time::Duration};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{config::JwtConfig, error::AppError, server::AppState};

pub const AUTH_COOKIE_NAME: &str = "token";

/// Who a verified credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Ulid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credential: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("credential subject is not a user id")]
    Subject,

    #[error("failed to issue credential: {0}")]
    Issue(jsonwebtoken::errors::Error),
}

/// Issues and verifies session credentials.
pub trait AuthService: Send + Sync {
    fn issue(&self, user_id: &Ulid) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// How long an issued credential stays valid.
    fn lifetime(&self) -> Duration;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    aud: String,
    exp: u64,
    iat: u64,
    iss: String,
    sub: String,
}

/// HS256 JSON web tokens with issuer and audience checks.
pub struct JwtAuthService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl JwtAuthService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.to_owned(),
            audience: config.audience.to_owned(),
            lifetime: Duration::from_secs(config.expiration_hours.saturating_mul(60 * 60)),
        }
    }
}

impl AuthService for JwtAuthService {
    fn issue(&self, user_id: &Ulid) -> Result<String, AuthError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            aud: self.audience.to_owned(),
            exp: now.saturating_add(self.lifetime.as_secs()),
            iat: now,
            iss: self.issuer.to_owned(),
            sub: user_id.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Issue)
    }

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.to_owned()]);
        validation.set_audience(&[self.audience.to_owned()]);

        let token_data = decode::<Claims>(token, &self.decoding, &validation)?;
        let user_id = Ulid::from_str(&token_data.claims.sub).map_err(|_| AuthError::Subject)?;

        Ok(Identity { user_id })
    }

    fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

pub fn build_cookie<'a>(token: String, lifetime: Duration) -> Cookie<'a> {
    let max_age = time::Duration::seconds(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX));

    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(max_age)
        .build()
}

pub fn removal_cookie<'a>() -> Cookie<'a> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

/// Authenticated caller. Rejects with 401 when the cookie is missing, the
/// credential does not verify or the user no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub eventhub_user::User);

impl AuthUser {
    pub fn id(&self) -> Result<Ulid, AppError> {
        Ulid::from_str(&self.0.id)
            .map_err(|_| AppError::Unauthenticated("Invalid token".to_owned()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated("Unauthorized".to_owned()))?;

        let Some(token) = jar
            .get(AUTH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned())
        else {
            return Err(AppError::Unauthenticated("Unauthorized".to_owned()));
        };

        let identity = state.auth.verify(&token).map_err(|err| {
            tracing::debug!(err = %err, "rejected credential");
            AppError::Unauthenticated("Invalid token".to_owned())
        })?;

        let Some(user) = state.user_query.find(identity.user_id.to_string()).await? else {
            return Err(AppError::Unauthenticated("Invalid token".to_owned()));
        };

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, audience: &str) -> JwtAuthService {
        JwtAuthService::new(&JwtConfig {
            secret: secret.to_owned(),
            issuer: "eventhub".to_owned(),
            audience: audience.to_owned(),
            expiration_hours: 24,
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let auth = service("test_secret_key_minimum_32_characters_long", "eventhub-web");
        let user_id = Ulid::new();

        let token = auth.issue(&user_id).unwrap();
        assert_eq!(auth.verify(&token).unwrap().user_id, user_id);
        assert_eq!(auth.lifetime(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        let auth = JwtAuthService::new(&JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            issuer: "eventhub".to_owned(),
            audience: "eventhub-web".to_owned(),
            expiration_hours: u64::MAX,
        });

        assert_eq!(auth.lifetime(), Duration::from_secs(u64::MAX));
        assert!(auth.issue(&Ulid::new()).is_ok());
    }

    #[test]
    fn test_verify_rejects_foreign_tokens() {
        let auth = service("test_secret_key_minimum_32_characters_long", "eventhub-web");
        let other_secret = service("another_secret_key_minimum_32_characters", "eventhub-web");
        let other_audience = service("test_secret_key_minimum_32_characters_long", "mobile");

        let user_id = Ulid::new();
        assert!(auth.verify(&other_secret.issue(&user_id).unwrap()).is_err());
        assert!(auth.verify(&other_audience.issue(&user_id).unwrap()).is_err());
        assert!(auth.verify("not-a-token").is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = build_cookie("abc".to_owned(), Duration::from_secs(3600)).to_string();

        assert!(cookie.starts_with("token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
    }
}
