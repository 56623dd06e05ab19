//! Bearer token authentication
//!
//! Tokens are HS256 JWTs minted by the identity provider. The `sub` claim is
//! the account id; `email` is optional. A principal seen for the first time
//! is provisioned as a free user before the handler runs.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize};

use passvault_types::AccountId;

use crate::error::ApiError;
use crate::state::AppState;

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Principal {
    pub account_id: AccountId,
    pub email: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for Principal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts).ok_or(ApiError::Unauthorized("Missing bearer token"))?;

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &app_state.jwt_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = ?e, "Token validation failed");
            ApiError::Unauthorized("Invalid or expired token")
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(ApiError::Unauthorized("Invalid or expired token"));
        }

        let principal = Self {
            account_id: AccountId::new(data.claims.sub),
            email: data.claims.email,
        };
        app_state
            .accounts
            .provision(&principal.account_id, principal.email.as_deref())
            .await?;

        Ok(principal)
    }
}
