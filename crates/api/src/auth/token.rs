//! Signed bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use marzipan_core::UserUid;

use crate::error::ApiError;

/// Token lifetime in seconds (1 day).
const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Claims embedded in a bearer token.
///
/// `sub` is the user's external id; the internal numeric key never appears
/// in a token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens (HS256).
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user, expiring in one day.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if signing fails.
    pub fn issue(&self, uid: UserUid) -> Result<String, ApiError> {
        let claims = Claims {
            sub: uid.to_string(),
            exp: (Utc::now() + Duration::seconds(TOKEN_TTL_SECONDS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| ApiError::Internal("token signing failed".to_owned()))
    }

    /// Verify a token's signature and expiry and return the embedded uid.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` for any invalid, tampered or
    /// expired token, without distinguishing the cause.
    pub fn verify(&self, token: &str) -> Result<UserUid, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::Unauthenticated)?;
        UserUid::parse(&data.claims.sub).map_err(|_| ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("0123456789abcdef0123456789abcdef"))
    }

    #[test]
    fn issued_token_round_trips() {
        let svc = service();
        let uid = UserUid::generate();
        let token = svc.issue(uid).expect("signing succeeds");
        assert_eq!(svc.verify(&token).expect("verifies"), uid);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.issue(UserUid::generate()).expect("signing succeeds");
        token.push('x');
        assert!(matches!(svc.verify(&token), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = TokenService::new(&SecretString::from(
            "ffffffffffffffffffffffffffffffff",
        ));
        let token = other.issue(UserUid::generate()).expect("signing succeeds");
        assert!(matches!(
            service().verify(&token),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let claims = Claims {
            sub: UserUid::generate().to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .expect("signing succeeds");
        assert!(matches!(svc.verify(&token), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn token_with_garbage_subject_is_rejected() {
        let svc = service();
        let claims = Claims {
            sub: "not-a-uid".to_owned(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .expect("signing succeeds");
        assert!(matches!(svc.verify(&token), Err(ApiError::Unauthenticated)));
    }
}
