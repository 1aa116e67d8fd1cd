//! Catalog resolvers: the product surface plus its admin mutations.

use async_graphql::{Context, Object};

use crate::auth::rules;
use crate::db::catalog::CatalogRepository;
use crate::db::entity;
use crate::error::into_gql;
use crate::models::catalog::{
    Category, CreateInventoryGroupInput, CreateInventoryItemInput, DeliveryServiceProvider, Image,
    InventoryGroup, InventoryGroupCategory, InventoryGroupImage, InventoryGroupPatch,
    InventoryGroupRelationship, InventoryItem, InventoryItemPatch,
};
use crate::models::Merge;
use crate::state::ApiContext;

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    async fn inventory_groups(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<InventoryGroup>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<InventoryGroup>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<InventoryGroup>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<InventoryGroup>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_items(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<InventoryItem>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<InventoryItem>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<InventoryItem>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<InventoryItem>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_relationships(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<InventoryGroupRelationship>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<InventoryGroupRelationship>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_relationship(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<InventoryGroupRelationship>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<InventoryGroupRelationship>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_images(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<InventoryGroupImage>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<InventoryGroupImage>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_image(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<InventoryGroupImage>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<InventoryGroupImage>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_categories(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<InventoryGroupCategory>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<InventoryGroupCategory>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn inventory_group_category(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<InventoryGroupCategory>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<InventoryGroupCategory>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn categories(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Category>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Category>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn category(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<Category>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Category>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn images(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Image>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Image>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn image(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Image>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Image>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delivery_service_providers(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<DeliveryServiceProvider>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<DeliveryServiceProvider>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delivery_service_provider(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<DeliveryServiceProvider>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<DeliveryServiceProvider>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

#[derive(Default)]
pub struct CatalogMutation;

#[Object]
impl CatalogMutation {
    async fn create_inventory_group(
        &self,
        ctx: &Context<'_>,
        input: CreateInventoryGroupInput,
    ) -> async_graphql::Result<InventoryGroup> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        CatalogRepository::new(api.pool())
            .insert_group(
                &input.item_name,
                input.price,
                input.amount,
                input.display_amount,
                input.featured,
            )
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn update_inventory_group(
        &self,
        ctx: &Context<'_>,
        id: i32,
        patch: InventoryGroupPatch,
    ) -> async_graphql::Result<InventoryGroup> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let current = entity::fetch_one::<InventoryGroup>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        CatalogRepository::new(api.pool())
            .save_group(current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_inventory_group(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<InventoryGroup>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }

    async fn create_inventory_item(
        &self,
        ctx: &Context<'_>,
        input: CreateInventoryItemInput,
    ) -> async_graphql::Result<InventoryItem> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        CatalogRepository::new(api.pool())
            .insert_item(
                input.barcode,
                &input.note,
                input.arrived_at,
                input.inventory_group_id,
            )
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn update_inventory_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
        patch: InventoryItemPatch,
    ) -> async_graphql::Result<InventoryItem> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let current = entity::fetch_one::<InventoryItem>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        CatalogRepository::new(api.pool())
            .save_item(current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_inventory_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<InventoryItem>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }
}
