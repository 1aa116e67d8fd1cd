//! Order, review and cart resolvers.

use async_graphql::{Context, InputObject, Object};
use uuid::Uuid;

use marzipan_core::{Email, RoleKind};

use crate::auth::{
    self,
    rules::{self, ClientUserAgent},
};
use crate::db::entity;
use crate::db::orders::{CartRepository, OrderRepository};
use crate::db::users::NewUser;
use crate::error::{ApiError, into_gql};
use crate::models::Merge;
use crate::models::order::{CartItem, Order, OrderItem, OrderPatch, Review};
use crate::models::user::AddressFieldsInput;
use crate::state::ApiContext;

/// The account half of an unauthenticated order placement.
#[derive(Debug, InputObject)]
pub struct OrderCustomerInput {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
}

#[derive(Default)]
pub struct OrderQuery;

#[Object]
impl OrderQuery {
    async fn orders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Order>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Order>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn order(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Order>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Order>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn order_items(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OrderItem>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<OrderItem>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn order_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<OrderItem>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<OrderItem>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Review>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn review(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Review>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Review>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn cart_items(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CartItem>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<CartItem>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    /// A single cart row by its composite key.
    async fn cart_item(
        &self,
        ctx: &Context<'_>,
        inventory_group_id: i32,
        user_uid: Uuid,
    ) -> async_graphql::Result<Option<CartItem>> {
        let api = ctx.data::<ApiContext>()?;
        CartRepository::new(api.pool())
            .get(inventory_group_id, user_uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

#[derive(Default)]
pub struct OrderMutation;

#[Object]
impl OrderMutation {
    /// Place an order while creating the customer account in the same flow.
    async fn place_order_unauthenticated(
        &self,
        ctx: &Context<'_>,
        customer: OrderCustomerInput,
        address: AddressFieldsInput,
        delivery_service_provider_id: i32,
        inventory_group_ids: Vec<i32>,
    ) -> async_graphql::Result<Order> {
        let api = ctx.data::<ApiContext>()?;
        let email = Email::parse(&customer.email)
            .map_err(|e| into_gql(ApiError::BadRequest(e.to_string())))?;
        let password_hash = auth::hash_password(&customer.password).map_err(into_gql)?;
        let user_agent = ctx.data_opt::<ClientUserAgent>().and_then(|ua| ua.0.clone());

        let new_user = NewUser {
            email: email.into_inner(),
            password_hash,
            firstname: customer.firstname,
            lastname: customer.lastname,
            last_user_agent: user_agent,
            phone_number: customer.phone_number,
            role_id: RoleKind::Customer.id().as_i32(),
        };

        let (_user, order) = OrderRepository::new(api.pool())
            .place_order_with_user(
                &new_user,
                &address,
                delivery_service_provider_id,
                &inventory_group_ids,
            )
            .await
            .map_err(|e| into_gql(e.into()))?;

        Ok(order)
    }

    /// Place an order for the authenticated caller.
    async fn place_order_authenticated(
        &self,
        ctx: &Context<'_>,
        address: AddressFieldsInput,
        delivery_service_provider_id: i32,
        inventory_group_ids: Vec<i32>,
    ) -> async_graphql::Result<Order> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;
        OrderRepository::new(api.pool())
            .place_order(
                viewer.user.uid,
                &address,
                delivery_service_provider_id,
                &inventory_group_ids,
            )
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn update_order(
        &self,
        ctx: &Context<'_>,
        id: i32,
        patch: OrderPatch,
    ) -> async_graphql::Result<Order> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let current = entity::fetch_one::<Order>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        OrderRepository::new(api.pool())
            .save(current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_order(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<Order>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }

    /// Put an inventory group in the caller's cart.
    async fn create_cart_item(
        &self,
        ctx: &Context<'_>,
        inventory_group_id: i32,
        #[graphql(default = 1, validator(minimum = 1))] amount: i32,
    ) -> async_graphql::Result<CartItem> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;
        CartRepository::new(api.pool())
            .create(inventory_group_id, viewer.user.uid, amount)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    /// Take one unit out of the caller's cart. Returns `null` once the row
    /// is gone.
    async fn decrement_cart_item(
        &self,
        ctx: &Context<'_>,
        inventory_group_id: i32,
    ) -> async_graphql::Result<Option<CartItem>> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;
        CartRepository::new(api.pool())
            .decrement(inventory_group_id, viewer.user.uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}
