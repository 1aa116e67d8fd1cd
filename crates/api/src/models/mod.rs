//! Entity models: database row shapes doubling as public GraphQL objects.
//!
//! Each entity derives `sqlx::FromRow` for the storage side and
//! `SimpleObject` for the schema side; hidden columns (such as
//! `users.password`) carry `#[graphql(skip)]` so they never appear in the
//! public object shape. Partial updates use [`MaybeUndefined`] so an absent
//! field (keep the current value) is distinct from an explicit null (clear
//! a nullable field).

use async_graphql::MaybeUndefined;

pub mod catalog;
pub mod order;
pub mod user;

/// A pure merge of a partial input over the current row.
///
/// Update flow for every mutable entity: fetch the current row, `merge` the
/// patch over it, persist the result as a full-row save. Entities may accept
/// more than one patch shape (e.g. self-service vs. admin updates).
pub trait Merge<P> {
    /// Combine `patch` over `self`, field by field.
    #[must_use]
    fn merge(self, patch: P) -> Self;
}

/// Provided value, or fall back to the current one. Explicit null is
/// treated as absent for non-nullable columns.
pub(crate) fn keep<T>(patch: MaybeUndefined<T>, current: T) -> T {
    match patch {
        MaybeUndefined::Value(v) => v,
        MaybeUndefined::Null | MaybeUndefined::Undefined => current,
    }
}

/// Provided value, explicit null clears, absent keeps the current value.
pub(crate) fn keep_opt<T>(patch: MaybeUndefined<T>, current: Option<T>) -> Option<T> {
    match patch {
        MaybeUndefined::Value(v) => Some(v),
        MaybeUndefined::Null => None,
        MaybeUndefined::Undefined => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_prefers_provided_value() {
        assert_eq!(keep(MaybeUndefined::Value(2), 1), 2);
    }

    #[test]
    fn keep_falls_back_when_absent_or_null() {
        assert_eq!(keep(MaybeUndefined::Undefined, 1), 1);
        // Null cannot clear a non-nullable column.
        assert_eq!(keep(MaybeUndefined::Null, 1), 1);
    }

    #[test]
    fn keep_opt_distinguishes_null_from_absent() {
        assert_eq!(keep_opt(MaybeUndefined::Value(2), Some(1)), Some(2));
        assert_eq!(keep_opt(MaybeUndefined::Undefined, Some(1)), Some(1));
        assert_eq!(keep_opt::<i32>(MaybeUndefined::Null, Some(1)), None);
    }
}
