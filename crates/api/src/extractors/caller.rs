//! Caller identity extractor.
//!
//! Callable operations decide for themselves how to treat anonymous callers,
//! so this extractor never rejects: a missing, malformed or invalid bearer
//! token yields no identity.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::CallerIdentity;
use shared::jwt::JwtConfig;

use crate::app::AppState;
use crate::error::ApiError;

/// The verified caller, if the request carried a valid bearer token.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl Caller {
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.0.as_ref()
    }
}

/// Verifies the `Authorization: Bearer` header, if any.
pub fn identify(jwt: &JwtConfig, authorization: Option<&str>) -> Option<CallerIdentity> {
    let token = authorization?.strip_prefix("Bearer ")?.trim();
    match jwt.validate_token(token) {
        Ok(claims) => Some(CallerIdentity::new(claims.sub, claims.admin)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid bearer token");
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok());

        Ok(Caller(identify(&state.jwt, authorization)))
    }
}
