//! Catalog repository: inventory groups, items, and their joins.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::catalog::{
    Category, DeliveryServiceProvider, Image, InventoryGroup, InventoryGroupCategory,
    InventoryGroupImage, InventoryGroupRelationship, InventoryItem,
};
use crate::models::order::Review;

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new inventory group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_group(
        &self,
        item_name: &str,
        price: f64,
        amount: i32,
        display_amount: i32,
        featured: bool,
    ) -> Result<InventoryGroup, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryGroup>(
            r"
            INSERT INTO inventory_groups (item_name, price, amount, display_amount, featured)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(item_name)
        .bind(price)
        .bind(amount)
        .bind(display_amount)
        .bind(featured)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Persist a merged inventory group row in full.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row vanished,
    /// `RepositoryError::Database` for other failures.
    pub async fn save_group(&self, group: InventoryGroup) -> Result<InventoryGroup, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryGroup>(
            r"
            UPDATE inventory_groups
            SET item_name = $1, price = $2, amount = $3, display_amount = $4, featured = $5
            WHERE id = $6
            RETURNING *
            ",
        )
        .bind(&group.item_name)
        .bind(group.price)
        .bind(group.amount)
        .bind(group.display_amount)
        .bind(group.featured)
        .bind(group.id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound("InventoryGroup"))
    }

    /// Insert a new inventory item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the barcode already exists,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert_item(
        &self,
        barcode: i64,
        note: &str,
        arrived_at: chrono::DateTime<chrono::Utc>,
        inventory_group_id: i32,
    ) -> Result<InventoryItem, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryItem>(
            r"
            INSERT INTO inventory_items (barcode, note, arrived_at, inventory_group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(barcode)
        .bind(note)
        .bind(arrived_at)
        .bind(inventory_group_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "barcode already exists"))?;
        Ok(row)
    }

    /// Persist a merged inventory item row in full.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new barcode collides,
    /// `RepositoryError::NotFound` if the row vanished,
    /// `RepositoryError::Database` for other failures.
    pub async fn save_item(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryItem>(
            r"
            UPDATE inventory_items
            SET barcode = $1, note = $2, arrived_at = $3, inventory_group_id = $4
            WHERE id = $5
            RETURNING *
            ",
        )
        .bind(item.barcode)
        .bind(&item.note)
        .bind(item.arrived_at)
        .bind(item.inventory_group_id)
        .bind(item.id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "barcode already exists"))?;

        row.ok_or(RepositoryError::NotFound("InventoryItem"))
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row =
            sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(row)
    }

    /// Insert an image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_image(&self, url: &str) -> Result<Image, RepositoryError> {
        let row = sqlx::query_as::<_, Image>("INSERT INTO images (url) VALUES ($1) RETURNING *")
            .bind(url)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a delivery service provider.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_delivery_service_provider(
        &self,
        name: &str,
        pickup_time: chrono::DateTime<chrono::Utc>,
    ) -> Result<DeliveryServiceProvider, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryServiceProvider>(
            "INSERT INTO delivery_service_providers (name, pickup_time) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(pickup_time)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Join an inventory group to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn link_category(
        &self,
        inventory_group_id: i32,
        category_id: i32,
    ) -> Result<InventoryGroupCategory, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryGroupCategory>(
            r"
            INSERT INTO inventory_group_categories (inventory_group_id, category_id)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(inventory_group_id)
        .bind(category_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Join an inventory group to an image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn link_image(
        &self,
        inventory_group_id: i32,
        image_id: i32,
    ) -> Result<InventoryGroupImage, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryGroupImage>(
            r"
            INSERT INTO inventory_group_images (inventory_group_id, image_id)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(inventory_group_id)
        .bind(image_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Add a directed edge between two inventory groups.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn link_related(
        &self,
        from_group_id: i32,
        to_group_id: i32,
    ) -> Result<InventoryGroupRelationship, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryGroupRelationship>(
            r"
            INSERT INTO inventory_group_relationships (from_group_id, to_group_id)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(from_group_id)
        .bind(to_group_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}

/// Physical items belonging to an inventory group.
pub async fn items_for_group(
    pool: &PgPool,
    group_id: i32,
) -> Result<Vec<InventoryItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items WHERE inventory_group_id = $1 ORDER BY id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Reviews of an inventory group.
pub async fn reviews_for_group(
    pool: &PgPool,
    group_id: i32,
) -> Result<Vec<Review>, RepositoryError> {
    let rows = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE inventory_group_id = $1 ORDER BY id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Categories linked to an inventory group.
pub async fn categories_for_group(
    pool: &PgPool,
    group_id: i32,
) -> Result<Vec<Category>, RepositoryError> {
    let rows = sqlx::query_as::<_, Category>(
        r"
        SELECT c.* FROM categories c
        JOIN inventory_group_categories gc ON gc.category_id = c.id
        WHERE gc.inventory_group_id = $1
        ORDER BY c.id
        ",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Images linked to an inventory group.
pub async fn images_for_group(pool: &PgPool, group_id: i32) -> Result<Vec<Image>, RepositoryError> {
    let rows = sqlx::query_as::<_, Image>(
        r"
        SELECT i.* FROM images i
        JOIN inventory_group_images gi ON gi.image_id = i.id
        WHERE gi.inventory_group_id = $1
        ORDER BY i.id
        ",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Groups reachable over outgoing relationship edges.
pub async fn related_groups(
    pool: &PgPool,
    group_id: i32,
) -> Result<Vec<InventoryGroup>, RepositoryError> {
    let rows = sqlx::query_as::<_, InventoryGroup>(
        r"
        SELECT g.* FROM inventory_groups g
        JOIN inventory_group_relationships r ON r.to_group_id = g.id
        WHERE r.from_group_id = $1
        ORDER BY g.id
        ",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
