//! Access-token handling.
//!
//! Bazaar does not log users in itself. Access tokens are HS256 JWTs minted by the marketplace's identity service with
//! a secret shared with this server (`BZR_JWT_SECRET`). Handlers take a [`JwtClaims`] argument to require a valid
//! token and learn who is calling.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use bazaar_engine::db_types::UserId;
use chrono::{Duration, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

pub const ACCESS_TOKEN_QUERY_PARAM: &str = "access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: UserId,
}

/// Verifies access tokens. Register it as app data (`web::Data<TokenVerifier>`) so that [`JwtClaims`] can be
/// extracted in handlers.
pub struct TokenVerifier {
    key: Hs256Key,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    pub fn verify<S: AsRef<str>>(&self, token: S) -> Result<JwtClaims, AuthError> {
        let untrusted =
            UntrustedToken::new(token.as_ref()).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e}")))?;
        let token = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        let (_, claims) = token.into_parts();
        trace!("🔑️ Access token validated for {}", claims.custom.user_id);
        Ok(claims.custom)
    }
}

/// Mints access tokens. Production tokens come from the identity service; this is used by tooling and tests.
pub struct TokenIssuer {
    key: Hs256Key,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Issues a token for `user_id` that expires after `duration` (24 hours if not given).
    pub fn issue_token(&self, user_id: UserId, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(24));
        let mut claims = Claims::new(JwtClaims { user_id });
        claims.issued_at = Some(Utc::now());
        claims.expiration = Some(Utc::now() + duration);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::CouldNotIssueToken(format!("{e}")))
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

fn query_token(req: &HttpRequest) -> Option<String> {
    web::Query::<TokenQuery>::from_query(req.query_string()).ok()?.into_inner().access_token
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, AuthError> {
    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        error!("🔑️ No TokenVerifier has been registered with the app. All authenticated requests will fail.");
        AuthError::ValidationError("The server cannot verify tokens".to_string())
    })?;
    let token = bearer_token(req).or_else(|| query_token(req)).ok_or(AuthError::MissingToken)?;
    verifier.verify(token).map_err(|e| {
        debug!("🔑️ Rejected access token for {}. {e}", req.path());
        e
    })
}

impl FromRequest for JwtClaims {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
