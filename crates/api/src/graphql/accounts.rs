//! Account resolvers: registration, login, self-service, and the admin
//! CRUD surface for users, roles and addresses.

use async_graphql::{Context, MaybeUndefined, Object, SimpleObject};
use uuid::Uuid;

use marzipan_core::{Email, RoleKind, UserUid};

use crate::auth::{
    self,
    rules::{self, ClientUserAgent},
};
use crate::db::entity;
use crate::db::users::{self, NewUser, UserRepository};
use crate::error::{ApiError, into_gql};
use crate::models::user::{
    Address, AddressPatch, CreateAddressInput, CreateRoleInput, CreateUserInput, Role, RolePatch,
    UpdateMyselfInput, User, UserPatch,
};
use crate::models::Merge;
use crate::state::ApiContext;

/// A freshly authenticated user together with its bearer token.
#[derive(SimpleObject)]
pub struct AuthPayload {
    pub user: User,
    pub auth_token: String,
}

#[derive(Default)]
pub struct AccountQuery;

#[Object]
impl AccountQuery {
    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<User>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<User>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn user(&self, ctx: &Context<'_>, uid: Uuid) -> async_graphql::Result<Option<User>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<User>(api.pool(), uid)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn roles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Role>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Role>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn role(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Role>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Role>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn addresses(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Address>> {
        let api = ctx.data::<ApiContext>()?;
        entity::list_all::<Address>(api.pool())
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn address(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Address>> {
        let api = ctx.data::<ApiContext>()?;
        entity::get_one::<Address>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))
    }
}

#[derive(Default)]
pub struct AccountMutation;

#[Object]
impl AccountMutation {
    /// Create an account and sign the caller in.
    async fn register(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        firstname: String,
        lastname: String,
        phone_number: String,
    ) -> async_graphql::Result<AuthPayload> {
        let api = ctx.data::<ApiContext>()?;
        let email = Email::parse(&email)
            .map_err(|e| into_gql(ApiError::BadRequest(e.to_string())))?;
        let password_hash = auth::hash_password(&password).map_err(into_gql)?;
        let user_agent = ctx.data_opt::<ClientUserAgent>().and_then(|ua| ua.0.clone());

        let user = UserRepository::new(api.pool())
            .create(NewUser {
                email: email.into_inner(),
                password_hash,
                firstname,
                lastname,
                last_user_agent: user_agent,
                phone_number,
                role_id: RoleKind::Customer.id().as_i32(),
            })
            .await
            .map_err(|e| into_gql(e.into()))?;

        let auth_token = api.tokens().issue(UserUid::new(user.uid)).map_err(into_gql)?;
        Ok(AuthPayload { user, auth_token })
    }

    /// Exchange credentials for a bearer token.
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let api = ctx.data::<ApiContext>()?;
        let users = UserRepository::new(api.pool());

        let user = users
            .find_by_email(&email)
            .await
            .map_err(|e| into_gql(e.into()))?
            .ok_or_else(|| into_gql(ApiError::Unauthenticated))?;
        auth::verify_password(&password, &user.password).map_err(into_gql)?;

        let auth_token = api.tokens().issue(UserUid::new(user.uid)).map_err(into_gql)?;
        Ok(AuthPayload { user, auth_token })
    }

    /// Tokens are stateless, so this only proves the caller held a valid one.
    async fn logout(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        rules::require_authenticated(ctx).await.map_err(into_gql)?;
        Ok(true)
    }

    /// The caller's own account.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;
        Ok(viewer.user)
    }

    /// Update the caller's own account. Absent fields keep their values.
    async fn update_myself(
        &self,
        ctx: &Context<'_>,
        mut patch: UpdateMyselfInput,
    ) -> async_graphql::Result<User> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;

        if let MaybeUndefined::Value(email) = &patch.email {
            Email::parse(email).map_err(|e| into_gql(ApiError::BadRequest(e.to_string())))?;
        }
        patch.password = match patch.password {
            MaybeUndefined::Value(plain) => {
                MaybeUndefined::Value(auth::hash_password(&plain).map_err(into_gql)?)
            }
            other => other,
        };

        let merged = viewer.user.merge(patch);
        UserRepository::new(api.pool())
            .save(merged)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    /// Hard-delete the caller's own account.
    async fn delete_myself(&self, ctx: &Context<'_>, confirm: bool) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_authenticated(ctx).await.map_err(into_gql)?;
        if !confirm {
            return Err(into_gql(ApiError::BadRequest(
                "account deletion requires confirmation".to_owned(),
            )));
        }
        entity::delete_one::<User>(api.pool(), viewer.user.uid)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }

    /// Reassign a user's role. Admins cannot change their own.
    async fn change_role(
        &self,
        ctx: &Context<'_>,
        user_uid: Uuid,
        role_id: i32,
    ) -> async_graphql::Result<User> {
        let api = ctx.data::<ApiContext>()?;
        let viewer = rules::require_admin(ctx).await.map_err(into_gql)?;
        rules::reject_self_target(viewer.user.uid, user_uid).map_err(into_gql)?;
        entity::fetch_one::<Role>(api.pool(), role_id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        UserRepository::new(api.pool())
            .change_role(UserUid::new(user_uid), role_id)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn create_user(
        &self,
        ctx: &Context<'_>,
        input: CreateUserInput,
    ) -> async_graphql::Result<User> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let email = Email::parse(&input.email)
            .map_err(|e| into_gql(ApiError::BadRequest(e.to_string())))?;
        let password_hash = auth::hash_password(&input.password).map_err(into_gql)?;
        UserRepository::new(api.pool())
            .create(NewUser {
                email: email.into_inner(),
                password_hash,
                firstname: input.firstname,
                lastname: input.lastname,
                last_user_agent: None,
                phone_number: input.phone_number,
                role_id: input.role_id.unwrap_or(RoleKind::Customer.id().as_i32()),
            })
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        uid: Uuid,
        mut patch: UserPatch,
    ) -> async_graphql::Result<User> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;

        if let MaybeUndefined::Value(email) = &patch.email {
            Email::parse(email).map_err(|e| into_gql(ApiError::BadRequest(e.to_string())))?;
        }
        patch.password = match patch.password {
            MaybeUndefined::Value(plain) => {
                MaybeUndefined::Value(auth::hash_password(&plain).map_err(into_gql)?)
            }
            other => other,
        };

        let current = entity::fetch_one::<User>(api.pool(), uid)
            .await
            .map_err(|e| into_gql(e.into()))?;
        UserRepository::new(api.pool())
            .save(current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_user(&self, ctx: &Context<'_>, uid: Uuid) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<User>(api.pool(), uid)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }

    async fn create_role(
        &self,
        ctx: &Context<'_>,
        input: CreateRoleInput,
    ) -> async_graphql::Result<Role> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        users::insert_role(api.pool(), &input.name)
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn update_role(
        &self,
        ctx: &Context<'_>,
        id: i32,
        patch: RolePatch,
    ) -> async_graphql::Result<Role> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let current = entity::fetch_one::<Role>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        users::save_role(api.pool(), current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_role(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<Role>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }

    async fn create_address(
        &self,
        ctx: &Context<'_>,
        input: CreateAddressInput,
    ) -> async_graphql::Result<Address> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        users::insert_address(
            api.pool(),
            &input.street,
            &input.city,
            &input.zip,
            &input.country,
            input.user_uid,
        )
        .await
        .map_err(|e| into_gql(e.into()))
    }

    async fn update_address(
        &self,
        ctx: &Context<'_>,
        id: i32,
        patch: AddressPatch,
    ) -> async_graphql::Result<Address> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        let current = entity::fetch_one::<Address>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        users::save_address(api.pool(), current.merge(patch))
            .await
            .map_err(|e| into_gql(e.into()))
    }

    async fn delete_address(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<bool> {
        let api = ctx.data::<ApiContext>()?;
        rules::require_admin(ctx).await.map_err(into_gql)?;
        entity::delete_one::<Address>(api.pool(), id)
            .await
            .map_err(|e| into_gql(e.into()))?;
        Ok(true)
    }
}
