//! Credential and token utilities.
//!
//! Password hashing uses Argon2id with a fresh salt per call. Bearer tokens
//! are signed JWTs carrying the user's external id; identity resolution is
//! stateless (no server-side session).

pub mod rules;
pub mod token;

pub use token::TokenService;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::{HeaderMap, header};

use crate::error::ApiError;

/// Hash a password using Argon2id with a freshly generated salt.
///
/// # Errors
///
/// Returns `ApiError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal("password hashing failed".to_owned()))
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `ApiError::Unauthenticated` on mismatch or a malformed hash,
/// without distinguishing the two.
pub fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ApiError::Unauthenticated)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthenticated)
}

/// Extract the bearer token from an `Authorization` header, if present.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    strip_bearer(value).map(ToOwned::to_owned)
}

/// Strip the `Bearer ` scheme from an `Authorization` header value.
fn strip_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password("secret").expect("hashing succeeds");
        let b = hash_password("secret").expect("hashing succeeds");
        // Fresh salt per call: same input, different hashes.
        assert_ne!(a, b);
        assert_ne!(a, "secret");
        assert!(verify_password("secret", &a).is_ok());
        assert!(verify_password("secret", &b).is_ok());
    }

    #[test]
    fn wrong_password_fails_uniformly() {
        let hash = hash_password("secret").expect("hashing succeeds");
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(ApiError::Unauthenticated)
        ));
        assert!(matches!(
            verify_password("secret", "not-a-phc-string"),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn strips_bearer_scheme() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(strip_bearer("bearer abc"), Some("abc"));
        assert_eq!(strip_bearer("Basic dXNlcg=="), None);
        assert_eq!(strip_bearer("Bearer "), None);
        assert_eq!(strip_bearer("garbage"), None);
    }
}
