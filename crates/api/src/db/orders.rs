//! Order and cart repositories.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::RepositoryError;
use super::users::{self, NewUser};
use crate::models::order::{CartItem, Order, OrderItem, Review};
use crate::models::user::{Address, AddressFieldsInput, User};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Compose the nested order write: address, order header, one line per
    /// inventory group id, all in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back as a whole.
    pub async fn place_order(
        &self,
        user_uid: Uuid,
        address: &AddressFieldsInput,
        delivery_service_provider_id: i32,
        inventory_group_ids: &[i32],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = insert_order_rows(
            &mut tx,
            user_uid,
            address,
            delivery_service_provider_id,
            inventory_group_ids,
        )
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Place an order for a customer who does not have an account yet.
    ///
    /// The user row is inserted in the same transaction as the order, so a
    /// failure anywhere leaves no half-created account behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists,
    /// `RepositoryError::Database` if any statement fails; the transaction
    /// rolls back as a whole.
    pub async fn place_order_with_user(
        &self,
        new_user: &NewUser,
        address: &AddressFieldsInput,
        delivery_service_provider_id: i32,
        inventory_group_ids: &[i32],
    ) -> Result<(User, Order), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = users::insert_user(&mut *tx, new_user).await?;

        let order = insert_order_rows(
            &mut tx,
            user.uid,
            address,
            delivery_service_provider_id,
            inventory_group_ids,
        )
        .await?;

        tx.commit().await?;

        Ok((user, order))
    }

    /// Persist a merged order row in full.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row vanished,
    /// `RepositoryError::Database` for other failures.
    pub async fn save(&self, order: Order) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET confirmed = $1, address_id = $2, delivery_service_provider_id = $3
            WHERE id = $4
            RETURNING *
            ",
        )
        .bind(order.confirmed)
        .bind(order.address_id)
        .bind(order.delivery_service_provider_id)
        .bind(order.id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound("Order"))
    }
}

/// Delivery address, order header and one line per inventory group id,
/// executed on an already open transaction.
async fn insert_order_rows(
    tx: &mut Transaction<'_, Postgres>,
    user_uid: Uuid,
    address: &AddressFieldsInput,
    delivery_service_provider_id: i32,
    inventory_group_ids: &[i32],
) -> Result<Order, RepositoryError> {
    let address = sqlx::query_as::<_, Address>(
        r"
        INSERT INTO addresses (street, city, zip, country, user_uid)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.zip)
    .bind(&address.country)
    .bind(user_uid)
    .fetch_one(&mut **tx)
    .await?;

    let order = sqlx::query_as::<_, Order>(
        r"
        INSERT INTO orders (confirmed, user_uid, address_id, delivery_service_provider_id)
        VALUES (FALSE, $1, $2, $3)
        RETURNING *
        ",
    )
    .bind(user_uid)
    .bind(address.id)
    .bind(delivery_service_provider_id)
    .fetch_one(&mut **tx)
    .await?;

    for group_id in inventory_group_ids {
        sqlx::query("INSERT INTO order_items (order_id, inventory_group_id) VALUES ($1, $2)")
            .bind(order.id)
            .bind(group_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(order)
}

/// Line items of an order.
pub async fn items_for_order(
    pool: &PgPool,
    order_id: i32,
) -> Result<Vec<OrderItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert a product review.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails, including
/// ratings outside the 0-5 check constraint.
pub async fn insert_review(
    pool: &PgPool,
    user_uid: Uuid,
    inventory_group_id: i32,
    description: &str,
    rating: i32,
) -> Result<Review, RepositoryError> {
    let row = sqlx::query_as::<_, Review>(
        r"
        INSERT INTO reviews (user_uid, inventory_group_id, description, rating)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(user_uid)
    .bind(inventory_group_id)
    .bind(description)
    .bind(rating)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// What decrementing a cart row does, decided from its current amount.
#[derive(Debug, PartialEq, Eq)]
pub enum CartStep {
    /// Amount would reach zero: the row is removed instead.
    Remove,
    /// The row persists with the reduced amount.
    Decrement(i32),
}

impl CartStep {
    /// Decide the decrement action for a row currently holding `amount`.
    #[must_use]
    pub const fn from_amount(amount: i32) -> Self {
        if amount <= 1 {
            Self::Remove
        } else {
            Self::Decrement(amount - 1)
        }
    }
}

/// Repository for cart database operations.
///
/// Cart rows are keyed by (inventory group, user); `amount` is always >= 1.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look a cart row up by its composite key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        inventory_group_id: i32,
        user_uid: Uuid,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE inventory_group_id = $1 AND user_uid = $2",
        )
        .bind(inventory_group_id)
        .bind(user_uid)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the (group, user) row already
    /// exists, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        inventory_group_id: i32,
        user_uid: Uuid,
        amount: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO cart_items (inventory_group_id, user_uid, amount)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(inventory_group_id)
        .bind(user_uid)
        .bind(amount)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "cart item already exists"))?;
        Ok(row)
    }

    /// Reduce a cart row's amount by one; at amount 1 the row is deleted
    /// instead of storing zero. Returns the surviving row, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn decrement(
        &self,
        inventory_group_id: i32,
        user_uid: Uuid,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let amount: Option<i32> = sqlx::query_scalar(
            r"
            SELECT amount FROM cart_items
            WHERE inventory_group_id = $1 AND user_uid = $2
            FOR UPDATE
            ",
        )
        .bind(inventory_group_id)
        .bind(user_uid)
        .fetch_optional(&mut *tx)
        .await?;

        let amount = amount.ok_or(RepositoryError::NotFound("CartItem"))?;

        let result = match CartStep::from_amount(amount) {
            CartStep::Remove => {
                sqlx::query(
                    "DELETE FROM cart_items WHERE inventory_group_id = $1 AND user_uid = $2",
                )
                .bind(inventory_group_id)
                .bind(user_uid)
                .execute(&mut *tx)
                .await?;
                None
            }
            CartStep::Decrement(next) => {
                let row = sqlx::query_as::<_, CartItem>(
                    r"
                    UPDATE cart_items SET amount = $1
                    WHERE inventory_group_id = $2 AND user_uid = $3
                    RETURNING *
                    ",
                )
                .bind(next)
                .bind(inventory_group_id)
                .bind(user_uid)
                .fetch_one(&mut *tx)
                .await?;
                Some(row)
            }
        };

        tx.commit().await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_one_removes_the_row() {
        assert_eq!(CartStep::from_amount(1), CartStep::Remove);
    }

    #[test]
    fn larger_amounts_decrement_by_exactly_one() {
        assert_eq!(CartStep::from_amount(2), CartStep::Decrement(1));
        assert_eq!(CartStep::from_amount(10), CartStep::Decrement(9));
    }

    #[test]
    fn zero_never_survives() {
        // A row already at zero is removed, never driven negative.
        assert_eq!(CartStep::from_amount(0), CartStep::Remove);
    }
}
