//! Authorization roles.

use serde::{Deserialize, Serialize};

use crate::RoleId;

/// The authorization tier attached to a user.
///
/// Roles live in the `roles` table, but the two tiers the authorization
/// rules reason about are fixed: the seed and registration flows rely on
/// role id 1 being `admin` and role id 2 being `customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Full access, including the generated CRUD mutations.
    Admin,
    /// The default tier assigned on registration.
    Customer,
}

impl RoleKind {
    /// The fixed row id of this role in the `roles` table.
    #[must_use]
    pub const fn id(self) -> RoleId {
        match self {
            Self::Admin => RoleId::new(1),
            Self::Customer => RoleId::new(2),
        }
    }

    /// The unique role name as stored in the `roles` table.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }

    /// Look a role up by its stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Self::Admin),
            "customer" | "user" => Some(Self::Customer),
            _ => None,
        }
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        assert_eq!(RoleKind::from_name(RoleKind::Admin.name()), Some(RoleKind::Admin));
        assert_eq!(
            RoleKind::from_name(RoleKind::Customer.name()),
            Some(RoleKind::Customer)
        );
    }

    #[test]
    fn legacy_user_alias_maps_to_customer() {
        assert_eq!(RoleKind::from_name("user"), Some(RoleKind::Customer));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(RoleKind::from_name("root"), None);
    }

    #[test]
    fn fixed_ids_match_seed_order() {
        assert_eq!(RoleKind::Admin.id().as_i32(), 1);
        assert_eq!(RoleKind::Customer.id().as_i32(), 2);
    }
}
