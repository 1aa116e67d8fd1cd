//! User repository.

use sqlx::PgPool;
use uuid::Uuid;

use marzipan_core::UserUid;

use super::{RepositoryError, entity};
use crate::models::order::{CartItem, Order, Review};
use crate::models::user::{Address, Role, User};

/// Fields for inserting a user row. The password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub last_user_agent: Option<String>,
    pub phone_number: String,
    pub role_id: i32,
}

/// Full-row insert shared by account registration and the unauthenticated
/// order flow, which runs it inside the order transaction.
const INSERT_USER_SQL: &str = r"
    INSERT INTO users (uid, email, password, firstname, lastname, last_user_agent, phone_number, role_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING *
";

/// Insert a new user with a freshly generated external id.
///
/// Takes any executor so callers can run it on the pool or inside an open
/// transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email already exists,
/// `RepositoryError::Database` for other failures.
pub async fn insert_user<'e, E>(executor: E, new: &NewUser) -> Result<User, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(INSERT_USER_SQL)
        .bind(UserUid::generate().as_uuid())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.firstname)
        .bind(&new.lastname)
        .bind(&new.last_user_agent)
        .bind(&new.phone_number)
        .bind(new.role_id)
        .fetch_one(executor)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

    Ok(user)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look a user up by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Resolve a user's external id to the user and its role name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if the role row is missing.
    pub async fn find_with_role(
        &self,
        uid: UserUid,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(user) = entity::get_one::<User>(self.pool, uid.as_uuid()).await? else {
            return Ok(None);
        };

        let role_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
                .bind(user.role_id)
                .fetch_optional(self.pool)
                .await?;

        let role_name = role_name.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("user {uid} references missing role"))
        })?;

        Ok(Some((user, role_name)))
    }

    /// Insert a new user with a freshly generated external id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        insert_user(self.pool, &new).await
    }

    /// Persist a merged user row in full.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email collides,
    /// `RepositoryError::NotFound` if the row vanished,
    /// `RepositoryError::Database` for other failures.
    pub async fn save(&self, user: User) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET email = $1, password = $2, firstname = $3, lastname = $4,
                last_user_agent = $5, phone_number = $6, role_id = $7
            WHERE uid = $8
            RETURNING *
            ",
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.last_user_agent)
        .bind(&user.phone_number)
        .bind(user.role_id)
        .bind(user.uid)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        row.ok_or(RepositoryError::NotFound("User"))
    }

    /// Reassign a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn change_role(&self, uid: UserUid, role_id: i32) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, User>(
            "UPDATE users SET role_id = $1 WHERE uid = $2 RETURNING *",
        )
        .bind(role_id)
        .bind(uid.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound("User"))
    }
}

/// Insert a role.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the name already exists,
/// `RepositoryError::Database` for other failures.
pub async fn insert_role(pool: &PgPool, name: &str) -> Result<Role, RepositoryError> {
    let row = sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "role name already exists"))?;
    Ok(row)
}

/// Persist a merged role row.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the new name collides,
/// `RepositoryError::NotFound` if the row vanished,
/// `RepositoryError::Database` for other failures.
pub async fn save_role(pool: &PgPool, role: Role) -> Result<Role, RepositoryError> {
    let row = sqlx::query_as::<_, Role>("UPDATE roles SET name = $1 WHERE id = $2 RETURNING *")
        .bind(&role.name)
        .bind(role.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "role name already exists"))?;
    row.ok_or(RepositoryError::NotFound("Role"))
}

/// Insert an address for a user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_address(
    pool: &PgPool,
    street: &str,
    city: &str,
    zip: &str,
    country: &str,
    user_uid: Uuid,
) -> Result<Address, RepositoryError> {
    let row = sqlx::query_as::<_, Address>(
        r"
        INSERT INTO addresses (street, city, zip, country, user_uid)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(street)
    .bind(city)
    .bind(zip)
    .bind(country)
    .bind(user_uid)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Persist a merged address row in full.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the row vanished,
/// `RepositoryError::Database` for other failures.
pub async fn save_address(pool: &PgPool, address: Address) -> Result<Address, RepositoryError> {
    let row = sqlx::query_as::<_, Address>(
        r"
        UPDATE addresses
        SET street = $1, city = $2, zip = $3, country = $4
        WHERE id = $5
        RETURNING *
        ",
    )
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.zip)
    .bind(&address.country)
    .bind(address.id)
    .fetch_optional(pool)
    .await?;
    row.ok_or(RepositoryError::NotFound("Address"))
}

/// Addresses owned by a user.
pub async fn addresses_for(pool: &PgPool, uid: Uuid) -> Result<Vec<Address>, RepositoryError> {
    let rows =
        sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE user_uid = $1 ORDER BY id")
            .bind(uid)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Orders placed by a user.
pub async fn orders_for(pool: &PgPool, uid: Uuid) -> Result<Vec<Order>, RepositoryError> {
    let rows = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_uid = $1 ORDER BY id")
        .bind(uid)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Reviews written by a user.
pub async fn reviews_for(pool: &PgPool, uid: Uuid) -> Result<Vec<Review>, RepositoryError> {
    let rows = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE user_uid = $1 ORDER BY id")
        .bind(uid)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Cart rows held by a user.
pub async fn cart_items_for(pool: &PgPool, uid: Uuid) -> Result<Vec<CartItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE user_uid = $1 ORDER BY inventory_group_id",
    )
    .bind(uid)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_user_insert_names_every_column() {
        // Registration and order placement both rely on this statement
        // producing a complete row.
        for column in [
            "uid",
            "email",
            "password",
            "firstname",
            "lastname",
            "last_user_agent",
            "phone_number",
            "role_id",
        ] {
            assert!(INSERT_USER_SQL.contains(column), "missing column {column}");
        }
        assert!(INSERT_USER_SQL.contains("RETURNING *"));
    }
}
