//! Catalog entities: inventory groups and items, categories, images,
//! delivery providers, and the join tables connecting them.

use async_graphql::{ComplexObject, Context, InputObject, MaybeUndefined, SimpleObject};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::db::catalog;
use crate::db::entity::Entity;
use crate::error::into_gql;
use crate::models::order::Review;
use crate::models::{Merge, keep};
use crate::state::ApiContext;

/// A sellable product definition.
#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct InventoryGroup {
    pub id: i32,
    pub item_name: String,
    pub price: f64,
    /// Units physically in stock.
    pub amount: i32,
    /// Units shown as available to customers.
    pub display_amount: i32,
    pub featured: bool,
}

#[ComplexObject]
impl InventoryGroup {
    /// Physical units of this group, tracked by barcode.
    async fn items(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<InventoryItem>> {
        let api = ctx.data::<ApiContext>()?;
        catalog::items_for_group(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        let api = ctx.data::<ApiContext>()?;
        catalog::reviews_for_group(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn categories(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Category>> {
        let api = ctx.data::<ApiContext>()?;
        catalog::categories_for_group(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn images(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Image>> {
        let api = ctx.data::<ApiContext>()?;
        catalog::images_for_group(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    /// Groups this group points at (e.g. related products).
    async fn related(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<InventoryGroup>> {
        let api = ctx.data::<ApiContext>()?;
        catalog::related_groups(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

impl Entity for InventoryGroup {
    const TABLE: &'static str = "inventory_groups";
    const PK: &'static str = "id";
    const NAME: &'static str = "InventoryGroup";
    type Pk = i32;
}

#[derive(Debug, InputObject)]
pub struct CreateInventoryGroupInput {
    pub item_name: String,
    pub price: f64,
    pub amount: i32,
    pub display_amount: i32,
    #[graphql(default = false)]
    pub featured: bool,
}

#[derive(Debug, InputObject)]
pub struct InventoryGroupPatch {
    pub item_name: MaybeUndefined<String>,
    pub price: MaybeUndefined<f64>,
    pub amount: MaybeUndefined<i32>,
    pub display_amount: MaybeUndefined<i32>,
    pub featured: MaybeUndefined<bool>,
}

impl Merge<InventoryGroupPatch> for InventoryGroup {
    fn merge(self, patch: InventoryGroupPatch) -> Self {
        Self {
            item_name: keep(patch.item_name, self.item_name),
            price: keep(patch.price, self.price),
            amount: keep(patch.amount, self.amount),
            display_amount: keep(patch.display_amount, self.display_amount),
            featured: keep(patch.featured, self.featured),
            ..self
        }
    }
}

/// A physical unit of an inventory group.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct InventoryItem {
    pub id: i32,
    /// Unique barcode of this unit.
    pub barcode: i64,
    pub note: String,
    pub arrived_at: DateTime<Utc>,
    pub inventory_group_id: i32,
}

impl Entity for InventoryItem {
    const TABLE: &'static str = "inventory_items";
    const PK: &'static str = "id";
    const NAME: &'static str = "InventoryItem";
    type Pk = i32;
}

#[derive(Debug, InputObject)]
pub struct CreateInventoryItemInput {
    pub barcode: i64,
    pub note: String,
    pub arrived_at: DateTime<Utc>,
    pub inventory_group_id: i32,
}

#[derive(Debug, InputObject)]
pub struct InventoryItemPatch {
    pub barcode: MaybeUndefined<i64>,
    pub note: MaybeUndefined<String>,
    pub arrived_at: MaybeUndefined<DateTime<Utc>>,
    pub inventory_group_id: MaybeUndefined<i32>,
}

impl Merge<InventoryItemPatch> for InventoryItem {
    fn merge(self, patch: InventoryItemPatch) -> Self {
        Self {
            barcode: keep(patch.barcode, self.barcode),
            note: keep(patch.note, self.note),
            arrived_at: keep(patch.arrived_at, self.arrived_at),
            inventory_group_id: keep(patch.inventory_group_id, self.inventory_group_id),
            ..self
        }
    }
}

/// A directed edge between two inventory groups.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct InventoryGroupRelationship {
    pub id: i32,
    pub from_group_id: i32,
    pub to_group_id: i32,
}

impl Entity for InventoryGroupRelationship {
    const TABLE: &'static str = "inventory_group_relationships";
    const PK: &'static str = "id";
    const NAME: &'static str = "InventoryGroupRelationship";
    type Pk = i32;
}

/// Joins an inventory group to one of its images.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct InventoryGroupImage {
    pub id: i32,
    pub inventory_group_id: i32,
    pub image_id: i32,
}

impl Entity for InventoryGroupImage {
    const TABLE: &'static str = "inventory_group_images";
    const PK: &'static str = "id";
    const NAME: &'static str = "InventoryGroupImage";
    type Pk = i32;
}

/// Joins an inventory group to a category.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct InventoryGroupCategory {
    pub id: i32,
    pub inventory_group_id: i32,
    pub category_id: i32,
}

impl Entity for InventoryGroupCategory {
    const TABLE: &'static str = "inventory_group_categories";
    const PK: &'static str = "id";
    const NAME: &'static str = "InventoryGroupCategory";
    type Pk = i32;
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const PK: &'static str = "id";
    const NAME: &'static str = "Category";
    type Pk = i32;
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct Image {
    pub id: i32,
    pub url: String,
}

impl Entity for Image {
    const TABLE: &'static str = "images";
    const PK: &'static str = "id";
    const NAME: &'static str = "Image";
    type Pk = i32;
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct DeliveryServiceProvider {
    pub id: i32,
    pub name: String,
    pub pickup_time: DateTime<Utc>,
}

impl Entity for DeliveryServiceProvider {
    const TABLE: &'static str = "delivery_service_providers";
    const PK: &'static str = "id";
    const NAME: &'static str = "DeliveryServiceProvider";
    type Pk = i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> InventoryGroup {
        InventoryGroup {
            id: 1,
            item_name: "Chair".to_owned(),
            price: 49.5,
            amount: 2,
            display_amount: 2,
            featured: false,
        }
    }

    #[test]
    fn empty_patch_is_identity() {
        let before = sample_group();
        let after = before.clone().merge(InventoryGroupPatch {
            item_name: MaybeUndefined::Undefined,
            price: MaybeUndefined::Undefined,
            amount: MaybeUndefined::Undefined,
            display_amount: MaybeUndefined::Undefined,
            featured: MaybeUndefined::Undefined,
        });
        assert_eq!(after.item_name, before.item_name);
        assert!((after.price - before.price).abs() < f64::EPSILON);
        assert_eq!(after.amount, before.amount);
        assert_eq!(after.display_amount, before.display_amount);
        assert_eq!(after.featured, before.featured);
    }

    #[test]
    fn partial_patch_touches_only_named_fields() {
        let after = sample_group().merge(InventoryGroupPatch {
            item_name: MaybeUndefined::Undefined,
            price: MaybeUndefined::Value(59.0),
            amount: MaybeUndefined::Undefined,
            display_amount: MaybeUndefined::Undefined,
            featured: MaybeUndefined::Value(true),
        });
        assert!((after.price - 59.0).abs() < f64::EPSILON);
        assert!(after.featured);
        assert_eq!(after.item_name, "Chair");
        assert_eq!(after.amount, 2);
    }
}
