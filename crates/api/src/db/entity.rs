//! Generic CRUD over a closed set of entity descriptors.
//!
//! Every model implements [`Entity`], a tagged configuration record naming
//! its table, primary-key column and key type. The generic operations below
//! render their SQL from those constants; per-entity inserts and full-row
//! saves live in the domain repositories, since their column lists differ.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres};

use super::RepositoryError;

/// Descriptor for an entity backed by a single table.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Primary-key column name.
    const PK: &'static str;
    /// Entity name used in user-facing not-found errors.
    const NAME: &'static str;
    /// Primary-key type.
    type Pk: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static;
}

fn select_all_sql<E: Entity>() -> String {
    format!("SELECT * FROM {} ORDER BY {}", E::TABLE, E::PK)
}

fn select_one_sql<E: Entity>() -> String {
    format!("SELECT * FROM {} WHERE {} = $1", E::TABLE, E::PK)
}

fn delete_one_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE {} = $1", E::TABLE, E::PK)
}

/// Fetch all rows of an entity.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all<E: Entity>(pool: &PgPool) -> Result<Vec<E>, RepositoryError> {
    let sql = select_all_sql::<E>();
    let rows = sqlx::query_as::<_, E>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Fetch one row by primary key.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_one<E: Entity>(pool: &PgPool, pk: E::Pk) -> Result<Option<E>, RepositoryError> {
    let sql = select_one_sql::<E>();
    let row = sqlx::query_as::<_, E>(&sql)
        .bind(pk)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fetch one row by primary key, failing with a not-found error naming the
/// entity when it does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no row matches, or
/// `RepositoryError::Database` if the query fails.
pub async fn fetch_one<E: Entity>(pool: &PgPool, pk: E::Pk) -> Result<E, RepositoryError> {
    get_one::<E>(pool, pk)
        .await?
        .ok_or(RepositoryError::NotFound(E::NAME))
}

/// Delete one row by primary key.
///
/// Unconditional; cascades are whatever the schema enforces.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no row was deleted, or
/// `RepositoryError::Database` if the query fails.
pub async fn delete_one<E: Entity>(pool: &PgPool, pk: E::Pk) -> Result<(), RepositoryError> {
    let sql = delete_one_sql::<E>();
    let result = sqlx::query(&sql).bind(pk).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound(E::NAME));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::InventoryGroup;
    use crate::models::user::{Role, User};

    #[test]
    fn sql_is_rendered_from_the_descriptor() {
        assert_eq!(select_all_sql::<Role>(), "SELECT * FROM roles ORDER BY id");
        assert_eq!(
            select_one_sql::<InventoryGroup>(),
            "SELECT * FROM inventory_groups WHERE id = $1"
        );
        assert_eq!(
            delete_one_sql::<Role>(),
            "DELETE FROM roles WHERE id = $1"
        );
    }

    #[test]
    fn users_are_keyed_by_external_id() {
        assert_eq!(select_one_sql::<User>(), "SELECT * FROM users WHERE uid = $1");
        assert_eq!(delete_one_sql::<User>(), "DELETE FROM users WHERE uid = $1");
    }
}
