//! Users, roles and addresses.

use async_graphql::{ComplexObject, Context, InputObject, MaybeUndefined, SimpleObject};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::entity::{self, Entity};
use crate::db::users;
use crate::error::into_gql;
use crate::models::order::{CartItem, Order, Review};
use crate::models::{Merge, keep, keep_opt};
use crate::state::ApiContext;

/// A registered user.
///
/// The internal numeric key and the password hash exist on the row but are
/// never part of the public object shape; users are referenced externally
/// by `uid` alone.
#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct User {
    #[graphql(skip)]
    pub id: i32,
    pub uid: Uuid,
    pub email: String,
    #[graphql(skip)]
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub last_user_agent: Option<String>,
    pub phone_number: String,
    pub role_id: i32,
}

#[ComplexObject]
impl User {
    /// The user's authorization role.
    async fn role(&self, ctx: &Context<'_>) -> async_graphql::Result<Role> {
        let api = ctx.data::<ApiContext>()?;
        entity::fetch_one::<Role>(api.pool(), self.role_id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn addresses(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Address>> {
        let api = ctx.data::<ApiContext>()?;
        users::addresses_for(api.pool(), self.uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn orders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Order>> {
        let api = ctx.data::<ApiContext>()?;
        users::orders_for(api.pool(), self.uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn reviews(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Review>> {
        let api = ctx.data::<ApiContext>()?;
        users::reviews_for(api.pool(), self.uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn cart_items(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CartItem>> {
        let api = ctx.data::<ApiContext>()?;
        users::cart_items_for(api.pool(), self.uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const PK: &'static str = "uid";
    const NAME: &'static str = "User";
    type Pk = Uuid;
}

/// Fields for creating a user through the admin CRUD surface.
#[derive(Debug, InputObject)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    /// Defaults to the customer role.
    pub role_id: Option<i32>,
}

/// Self-service partial update; absent fields keep their current values.
#[derive(Debug, InputObject)]
pub struct UpdateMyselfInput {
    pub email: MaybeUndefined<String>,
    pub password: MaybeUndefined<String>,
    pub firstname: MaybeUndefined<String>,
    pub lastname: MaybeUndefined<String>,
    pub phone_number: MaybeUndefined<String>,
}

/// Admin partial update for a user.
#[derive(Debug, InputObject)]
pub struct UserPatch {
    pub email: MaybeUndefined<String>,
    pub password: MaybeUndefined<String>,
    pub firstname: MaybeUndefined<String>,
    pub lastname: MaybeUndefined<String>,
    pub phone_number: MaybeUndefined<String>,
    /// Nullable column: explicit null clears the stored value.
    pub last_user_agent: MaybeUndefined<String>,
    pub role_id: MaybeUndefined<i32>,
}

impl Merge<UpdateMyselfInput> for User {
    fn merge(self, patch: UpdateMyselfInput) -> Self {
        Self {
            email: keep(patch.email, self.email),
            password: keep(patch.password, self.password),
            firstname: keep(patch.firstname, self.firstname),
            lastname: keep(patch.lastname, self.lastname),
            phone_number: keep(patch.phone_number, self.phone_number),
            ..self
        }
    }
}

impl Merge<UserPatch> for User {
    fn merge(self, patch: UserPatch) -> Self {
        Self {
            email: keep(patch.email, self.email),
            password: keep(patch.password, self.password),
            firstname: keep(patch.firstname, self.firstname),
            lastname: keep(patch.lastname, self.lastname),
            phone_number: keep(patch.phone_number, self.phone_number),
            last_user_agent: keep_opt(patch.last_user_agent, self.last_user_agent),
            role_id: keep(patch.role_id, self.role_id),
            ..self
        }
    }
}

/// An authorization tier.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

impl Entity for Role {
    const TABLE: &'static str = "roles";
    const PK: &'static str = "id";
    const NAME: &'static str = "Role";
    type Pk = i32;
}

#[derive(Debug, InputObject)]
pub struct CreateRoleInput {
    pub name: String,
}

#[derive(Debug, InputObject)]
pub struct RolePatch {
    pub name: MaybeUndefined<String>,
}

impl Merge<RolePatch> for Role {
    fn merge(self, patch: RolePatch) -> Self {
        Self {
            name: keep(patch.name, self.name),
            ..self
        }
    }
}

/// A user's postal address.
#[derive(Debug, Clone, SimpleObject, FromRow)]
pub struct Address {
    pub id: i32,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub user_uid: Uuid,
}

impl Entity for Address {
    const TABLE: &'static str = "addresses";
    const PK: &'static str = "id";
    const NAME: &'static str = "Address";
    type Pk = i32;
}

/// The address fields themselves, shared by `createAddress` and the
/// order-placement nested write.
#[derive(Debug, Clone, InputObject)]
pub struct AddressFieldsInput {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, InputObject)]
pub struct CreateAddressInput {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub user_uid: Uuid,
}

#[derive(Debug, InputObject)]
pub struct AddressPatch {
    pub street: MaybeUndefined<String>,
    pub city: MaybeUndefined<String>,
    pub zip: MaybeUndefined<String>,
    pub country: MaybeUndefined<String>,
}

impl Merge<AddressPatch> for Address {
    fn merge(self, patch: AddressPatch) -> Self {
        Self {
            street: keep(patch.street, self.street),
            city: keep(patch.city, self.city),
            zip: keep(patch.zip, self.zip),
            country: keep(patch.country, self.country),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            uid: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            password: "$argon2id$hash".to_owned(),
            firstname: "Ada".to_owned(),
            lastname: "Lovelace".to_owned(),
            last_user_agent: Some("curl/8".to_owned()),
            phone_number: "+44 1".to_owned(),
            role_id: 2,
        }
    }

    fn empty_user_patch() -> UserPatch {
        UserPatch {
            email: MaybeUndefined::Undefined,
            password: MaybeUndefined::Undefined,
            firstname: MaybeUndefined::Undefined,
            lastname: MaybeUndefined::Undefined,
            phone_number: MaybeUndefined::Undefined,
            last_user_agent: MaybeUndefined::Undefined,
            role_id: MaybeUndefined::Undefined,
        }
    }

    #[test]
    fn empty_patch_leaves_every_field_unchanged() {
        let before = sample_user();
        let after = before.clone().merge(empty_user_patch());
        assert_eq!(after.email, before.email);
        assert_eq!(after.password, before.password);
        assert_eq!(after.firstname, before.firstname);
        assert_eq!(after.lastname, before.lastname);
        assert_eq!(after.phone_number, before.phone_number);
        assert_eq!(after.last_user_agent, before.last_user_agent);
        assert_eq!(after.role_id, before.role_id);
        assert_eq!(after.uid, before.uid);
    }

    #[test]
    fn provided_fields_override_current_values() {
        let after = sample_user().merge(UserPatch {
            email: MaybeUndefined::Value("new@example.com".to_owned()),
            role_id: MaybeUndefined::Value(1),
            ..empty_user_patch()
        });
        assert_eq!(after.email, "new@example.com");
        assert_eq!(after.role_id, 1);
        assert_eq!(after.firstname, "Ada");
    }

    #[test]
    fn null_clears_only_nullable_fields() {
        let after = sample_user().merge(UserPatch {
            last_user_agent: MaybeUndefined::Null,
            email: MaybeUndefined::Null,
            ..empty_user_patch()
        });
        assert_eq!(after.last_user_agent, None);
        // Non-nullable column keeps its value on explicit null.
        assert_eq!(after.email, "ada@example.com");
    }

    #[test]
    fn self_service_patch_cannot_touch_role() {
        let after = sample_user().merge(UpdateMyselfInput {
            email: MaybeUndefined::Value("new@example.com".to_owned()),
            password: MaybeUndefined::Undefined,
            firstname: MaybeUndefined::Undefined,
            lastname: MaybeUndefined::Undefined,
            phone_number: MaybeUndefined::Undefined,
        });
        assert_eq!(after.role_id, 2);
        assert_eq!(after.email, "new@example.com");
    }
}
