//! Orders, order items, cart items and reviews.

use async_graphql::{ComplexObject, Context, InputObject, MaybeUndefined, SimpleObject};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::entity::{self, Entity};
use crate::db::orders;
use crate::error::into_gql;
use crate::models::user::Address;
use crate::models::{Merge, keep};
use crate::state::ApiContext;

/// An order header; line items hang off it.
#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct Order {
    pub id: i32,
    pub confirmed: bool,
    pub user_uid: Uuid,
    pub address_id: i32,
    pub delivery_service_provider_id: i32,
}

#[ComplexObject]
impl Order {
    async fn items(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OrderItem>> {
        let api = ctx.data::<ApiContext>()?;
        orders::items_for_order(api.pool(), self.id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn address(&self, ctx: &Context<'_>) -> async_graphql::Result<Address> {
        let api = ctx.data::<ApiContext>()?;
        entity::fetch_one::<Address>(api.pool(), self.address_id)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const PK: &'static str = "id";
    const NAME: &'static str = "Order";
    type Pk = i32;
}

#[derive(Debug, InputObject)]
pub struct OrderPatch {
    pub confirmed: MaybeUndefined<bool>,
    pub address_id: MaybeUndefined<i32>,
    pub delivery_service_provider_id: MaybeUndefined<i32>,
}

impl Merge<OrderPatch> for Order {
    fn merge(self, patch: OrderPatch) -> Self {
        Self {
            confirmed: keep(patch.confirmed, self.confirmed),
            address_id: keep(patch.address_id, self.address_id),
            delivery_service_provider_id: keep(
                patch.delivery_service_provider_id,
                self.delivery_service_provider_id,
            ),
            ..self
        }
    }
}

/// One line of an order, referencing the purchased inventory group.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub inventory_group_id: i32,
}

impl Entity for OrderItem {
    const TABLE: &'static str = "order_items";
    const PK: &'static str = "id";
    const NAME: &'static str = "OrderItem";
    type Pk = i32;
}

/// A cart row, uniquely keyed by (inventory group, user).
///
/// `amount` never reaches zero: decrementing a row at amount 1 deletes it.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct CartItem {
    pub inventory_group_id: i32,
    pub user_uid: Uuid,
    pub amount: i32,
}

impl Entity for CartItem {
    const TABLE: &'static str = "cart_items";
    // Composite key; this column only orders the generated list query.
    const PK: &'static str = "user_uid";
    const NAME: &'static str = "CartItem";
    type Pk = Uuid;
}

/// A product review.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct Review {
    pub id: i32,
    pub user_uid: Uuid,
    pub inventory_group_id: i32,
    pub description: String,
    /// 0-5 scale.
    pub rating: i32,
}

impl Entity for Review {
    const TABLE: &'static str = "reviews";
    const PK: &'static str = "id";
    const NAME: &'static str = "Review";
    type Pk = i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_order_patch_is_identity() {
        let before = Order {
            id: 3,
            confirmed: false,
            user_uid: Uuid::new_v4(),
            address_id: 2,
            delivery_service_provider_id: 4,
        };
        let after = before.clone().merge(OrderPatch {
            confirmed: MaybeUndefined::Undefined,
            address_id: MaybeUndefined::Undefined,
            delivery_service_provider_id: MaybeUndefined::Undefined,
        });
        assert_eq!(after.confirmed, before.confirmed);
        assert_eq!(after.address_id, before.address_id);
        assert_eq!(
            after.delivery_service_provider_id,
            before.delivery_service_provider_id
        );
    }

    #[test]
    fn confirming_an_order_keeps_its_destination() {
        let after = Order {
            id: 3,
            confirmed: false,
            user_uid: Uuid::new_v4(),
            address_id: 2,
            delivery_service_provider_id: 4,
        }
        .merge(OrderPatch {
            confirmed: MaybeUndefined::Value(true),
            address_id: MaybeUndefined::Undefined,
            delivery_service_provider_id: MaybeUndefined::Undefined,
        });
        assert!(after.confirmed);
        assert_eq!(after.address_id, 2);
    }
}
