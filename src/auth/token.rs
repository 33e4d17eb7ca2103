use crate::auth::guard::AuthRejection;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};

/// Lifetime of every issued token. Tokens are never renewed.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// The only algorithm accepted on verification.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a symmetric secret fixed for the
/// lifetime of the process.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Builds the signing keys. An empty secret is a configuration fault.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Internal("token signing secret is empty".into()));
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked against our own clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Generates a token for `user_id` that expires 24 hours from now.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Generates a token as if it were issued at `issued_at`.
    ///
    /// The output depends only on the user id, the issue time and the secret.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthRejection> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies the signature, decodes the claims and checks expiry against `now`.
    ///
    /// The header algorithm must be exactly HS256; `none` and every other
    /// algorithm are rejected before the signature is looked at.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthRejection> {
        let header = decode_header(token).map_err(|_| AuthRejection::BadSignature)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(AuthRejection::BadSignature);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::Json(_)
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Utf8(_) => AuthRejection::MalformedClaims,
                _ => AuthRejection::BadSignature,
            })?;

        if now.timestamp() >= claims.exp {
            return Err(AuthRejection::Expired);
        }

        Ok(claims)
    }
}
