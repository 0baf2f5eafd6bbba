//! Identity types: roles, stored profiles, and the resolved principal.
//!
//! A [`Principal`] is the process-wide answer to "who is acting right now."
//! It is replaced wholesale on every session event - sign-in, sign-out,
//! token refresh, restore - never mutated field by field, so readers can
//! never observe a torn update.

use crate::identifiers::{UserId, Zone};
use serde::{Deserialize, Serialize};

/// Role of an authenticated actor.
///
/// Serialized in camelCase to match the record store's profile rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Unauthenticated or general-audience user
    #[default]
    Public,
    /// Zone staff - bound to exactly one zone
    Staff,
    /// Administrator for a state's zones
    StateAdmin,
    /// Platform-wide administrator
    SuperAdmin,
}

impl Role {
    /// True for roles that route to the admin area
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::StateAdmin | Role::SuperAdmin)
    }
}

/// Stored profile record, keyed by [`UserId`].
///
/// A valid credential alone is not a usable session; the profile row is
/// what turns it into a trusted principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owner of this profile
    pub user_id: UserId,
    /// Contact address, as registered with the credential provider
    pub email: String,
    /// Human-readable name, if the user set one
    pub display_name: Option<String>,
    /// Role decided at registration / by an admin
    pub role: Role,
    /// Assigned zone - meaningful only for [`Role::Staff`]
    pub zone: Option<Zone>,
}

/// The resolved identity and role of the current actor.
///
/// `resolved == false` means no resolution attempt has completed yet and
/// **no other field may be trusted** - consumers must treat the principal
/// as "unknown, do not route."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identity, present only when authenticated
    pub user_id: Option<UserId>,
    /// Email of the authenticated user
    pub email: Option<String>,
    /// Display name of the authenticated user
    pub display_name: Option<String>,
    /// Effective role; [`Role::Public`] when unauthenticated
    pub role: Role,
    /// Assigned zone, for staff principals
    pub zone: Option<Zone>,
    /// Whether a resolution attempt has completed (success or failure)
    pub resolved: bool,
}

impl Principal {
    /// The initial principal at process start: nothing is known yet.
    pub fn unresolved() -> Self {
        Self {
            user_id: None,
            email: None,
            display_name: None,
            role: Role::Public,
            zone: None,
            resolved: false,
        }
    }

    /// A terminal "no session" principal: resolution completed, nobody is
    /// signed in.
    pub fn unauthenticated() -> Self {
        Self {
            user_id: None,
            email: None,
            display_name: None,
            role: Role::Public,
            zone: None,
            resolved: true,
        }
    }

    /// A terminal authenticated principal built from a stored profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: Some(profile.user_id),
            email: Some(profile.email.clone()),
            display_name: profile.display_name.clone(),
            role: profile.role,
            zone: profile.zone.clone(),
            resolved: true,
        }
    }

    /// True when resolution completed with a live identity
    pub fn is_authenticated(&self) -> bool {
        self.resolved && self.user_id.is_some()
    }

    /// True for authenticated principals holding an admin role
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role.is_admin()
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::unresolved()
    }
}
