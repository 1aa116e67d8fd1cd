//! Authorization rule predicates.
//!
//! Plain async functions over the request context, combined with ordinary
//! control flow; resolvers call the `require_*` predicate they need before
//! touching data. A missing token, an invalid or expired token and a
//! non-existent user are deliberately indistinguishable.

use async_graphql::Context;
use uuid::Uuid;

use marzipan_core::RoleKind;

use crate::db::users::UserRepository;
use crate::error::{ApiError, ApiResult};
use crate::models::user::User;
use crate::state::ApiContext;

/// The raw bearer token extracted from the `Authorization` header, stored
/// in the request data by the HTTP handler.
pub struct BearerToken(pub String);

/// The caller's `User-Agent` header, stored in the request data.
pub struct ClientUserAgent(pub Option<String>);

/// The resolved identity behind a request.
pub struct Viewer {
    pub user: User,
    pub role: RoleKind,
}

/// Resolve the bearer token on this request to a user and role.
///
/// # Errors
///
/// `ApiError::Unauthenticated` if there is no token, the token does not
/// verify, or no user exists for the embedded id.
pub async fn viewer(ctx: &Context<'_>) -> ApiResult<Viewer> {
    let api = ctx
        .data::<ApiContext>()
        .map_err(|_| ApiError::Internal("missing api context".to_owned()))?;
    let token = ctx
        .data_opt::<BearerToken>()
        .ok_or(ApiError::Unauthenticated)?;

    let uid = api.tokens().verify(&token.0)?;

    let users = UserRepository::new(api.pool());
    let (user, role_name) = users
        .find_with_role(uid)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let role = RoleKind::from_name(&role_name)
        .ok_or_else(|| ApiError::Internal(format!("unknown role: {role_name}")))?;

    Ok(Viewer { user, role })
}

/// Any resolved role is enough.
pub async fn require_authenticated(ctx: &Context<'_>) -> ApiResult<Viewer> {
    viewer(ctx).await
}

/// The caller must hold the non-admin role.
pub async fn require_user(ctx: &Context<'_>) -> ApiResult<Viewer> {
    let v = viewer(ctx).await?;
    check_role(v.role, RoleKind::Customer)?;
    Ok(v)
}

/// The caller must hold the admin role.
pub async fn require_admin(ctx: &Context<'_>) -> ApiResult<Viewer> {
    let v = viewer(ctx).await?;
    check_role(v.role, RoleKind::Admin)?;
    Ok(v)
}

/// The role predicate itself: authorized only when the resolved role equals
/// the required one.
fn check_role(resolved: RoleKind, required: RoleKind) -> ApiResult<()> {
    if resolved == required {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// An admin may not act on their own account through the admin surface.
///
/// # Errors
///
/// `ApiError::BadRequest` when the target is the caller.
pub fn reject_self_target(viewer_uid: Uuid, target_uid: Uuid) -> ApiResult<()> {
    if viewer_uid == target_uid {
        Err(ApiError::BadRequest(
            "admins cannot change their own role".to_owned(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_role_is_authorized() {
        assert!(check_role(RoleKind::Admin, RoleKind::Admin).is_ok());
        assert!(check_role(RoleKind::Customer, RoleKind::Customer).is_ok());
    }

    #[test]
    fn mismatched_role_is_uniformly_forbidden() {
        assert!(matches!(
            check_role(RoleKind::Customer, RoleKind::Admin),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            check_role(RoleKind::Admin, RoleKind::Customer),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn acting_on_another_account_is_allowed() {
        assert!(reject_self_target(Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn acting_on_own_account_is_rejected() {
        let uid = Uuid::new_v4();
        assert!(matches!(
            reject_self_target(uid, uid),
            Err(ApiError::BadRequest(_))
        ));
    }
}
