//! Route areas and the navigation guard.
//!
//! The guard maps an identity snapshot to the UI area it must live in. It
//! runs on every identity change, not just the first, so `decide` is
//! idempotent: re-applying it when already in the correct area yields no
//! redirect.

use zonal_core::Principal;

/// The three top-level UI areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteArea {
    /// Unauthenticated surfaces (welcome, sign-in)
    Public,
    /// General authenticated surfaces
    General,
    /// Admin dashboards
    Admin,
}

/// The area a principal must be routed to.
///
/// Unresolved principals are "unknown, do not route" and map to the public
/// area, same as resolved-unauthenticated ones.
pub fn required_area(principal: &Principal) -> RouteArea {
    if !principal.is_authenticated() {
        RouteArea::Public
    } else if principal.role.is_admin() {
        RouteArea::Admin
    } else {
        RouteArea::General
    }
}

/// Tracks the UI's current area and emits redirect decisions.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    current: RouteArea,
}

impl NavigationGuard {
    /// Create a guard; UIs start in the public area.
    pub fn new() -> Self {
        Self {
            current: RouteArea::Public,
        }
    }

    /// Create a guard for a UI already in a known area.
    pub fn starting_at(area: RouteArea) -> Self {
        Self { current: area }
    }

    /// The area the guard believes the UI is in.
    pub fn current(&self) -> RouteArea {
        self.current
    }

    /// Decide whether the UI must move for this principal.
    ///
    /// Returns `Some(target)` when a redirect is required, `None` when the
    /// UI is already where it belongs. Applying the same principal twice
    /// yields `None` the second time.
    pub fn decide(&mut self, principal: &Principal) -> Option<RouteArea> {
        let target = required_area(principal);
        if target == self.current {
            None
        } else {
            self.current = target;
            Some(target)
        }
    }
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new()
    }
}
