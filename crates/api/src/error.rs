//! Unified error handling for GraphQL resolvers.
//!
//! Every resolver returns `Result<T, async_graphql::Error>`; failures are
//! built from [`ApiError`] via [`ErrorExtensions`] so the response carries a
//! stable `code` extension alongside a client-safe message.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired token, wrong password, or unknown user.
    /// Deliberately carries no detail about which factor failed.
    #[error("not authenticated")]
    Unauthenticated,

    /// The caller is authenticated but the role predicate is false.
    #[error("not allowed")]
    Forbidden,

    /// A lookup by primary key yielded nothing. Carries the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The stable machine-readable code attached to the GraphQL error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    /// The message exposed to clients. Server-side details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Not authenticated".to_owned(),
            Self::Forbidden => "Not allowed".to_owned(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Database(err) => Self::Database(err),
            RepositoryError::NotFound(entity) => Self::NotFound(entity),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::DataCorruption(msg) => Self::Internal(msg),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "resolver error");
        }
        async_graphql::Error::new(self.public_message())
            .extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Result type alias for resolver-facing service functions.
pub type ApiResult<T> = Result<T, ApiError>;

/// Convert an [`ApiError`] into a GraphQL field error.
///
/// Shorthand for `.map_err(into_gql)?` in resolvers.
pub fn into_gql(e: ApiError) -> async_graphql::Error {
    e.extend()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_message() {
        // A wrong password and an unknown user must be indistinguishable.
        assert_eq!(
            ApiError::Unauthenticated.public_message(),
            "Not authenticated"
        );
        assert_eq!(ApiError::Unauthenticated.code(), "UNAUTHENTICATED");
    }

    #[test]
    fn forbidden_is_uniform() {
        assert_eq!(ApiError::Forbidden.public_message(), "Not allowed");
        assert_eq!(ApiError::Forbidden.code(), "FORBIDDEN");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ApiError::NotFound("Order");
        assert_eq!(err.public_message(), "Order not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err = ApiError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn repository_errors_map_onto_the_taxonomy() {
        let e: ApiError = RepositoryError::NotFound("Role").into();
        assert_eq!(e.code(), "NOT_FOUND");
        let e: ApiError = RepositoryError::Conflict("email already exists".into()).into();
        assert_eq!(e.public_message(), "email already exists");
    }
}
