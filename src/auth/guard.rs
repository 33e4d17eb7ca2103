//! The per-request authorization decision.
//!
//! `authorize` turns the request headers into either an authenticated user id or a
//! rejection reason. It performs no I/O: the token alone decides, and the user row is
//! not consulted.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Why a protected request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header, a non-`Bearer` scheme, or an empty credential.
    MissingOrMalformedHeader,
    /// Unreadable header, unexpected algorithm, or signature mismatch.
    BadSignature,
    /// Subject or expiry missing or of the wrong type.
    MalformedClaims,
    Expired,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            AuthRejection::MissingOrMalformedHeader => "Authorization header missing or invalid",
            AuthRejection::BadSignature => "Invalid token",
            AuthRejection::MalformedClaims => "Invalid token claims",
            AuthRejection::Expired => "Token expired",
        };
        f.write_str(msg)
    }
}

impl From<AuthRejection> for AppError {
    fn from(rejection: AuthRejection) -> AppError {
        AppError::Unauthorized(rejection.to_string())
    }
}

/// Terminal state of the guard for one request.
#[derive(Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Authorized(AuthenticatedUserId),
    Rejected(AuthRejection),
}

/// Pulls the credential out of `Authorization: Bearer <token>`.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

pub fn authorize(headers: &HeaderMap, tokens: &TokenService, now: DateTime<Utc>) -> GuardOutcome {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return GuardOutcome::Rejected(AuthRejection::MissingOrMalformedHeader),
    };

    match tokens.verify_at(token, now) {
        Ok(claims) => GuardOutcome::Authorized(AuthenticatedUserId(claims.sub)),
        Err(rejection) => GuardOutcome::Rejected(rejection),
    }
}
