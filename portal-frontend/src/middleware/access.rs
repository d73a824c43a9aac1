//! Route access table: who may open which page, and where everyone else goes.
//!
//! Decisions depend only on the current role and the target route; nothing
//! about earlier navigation is remembered.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIGN_IN_ROUTE: &str = "/auth/sign-in";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperUser => "SUPER_USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Home page for each kind of visitor; `None` means not signed in.
pub fn landing_route(role: Option<Role>) -> &'static str {
    match role {
        None => SIGN_IN_ROUTE,
        Some(Role::SuperUser) => "/dashboard/super-user",
        Some(Role::Admin) => "/dashboard/admin",
        Some(Role::User) => "/dashboard/user",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Redirect(&'static str),
}

/// Access rule attached to a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAccess {
    /// Roles admitted; empty admits every signed-in role.
    pub allowed: &'static [Role],
    pub require_auth: bool,
    /// Where unauthenticated visitors are sent.
    pub fallback: &'static str,
}

impl RouteAccess {
    pub const fn roles(allowed: &'static [Role]) -> Self {
        Self {
            allowed,
            require_auth: true,
            fallback: SIGN_IN_ROUTE,
        }
    }

    pub const fn signed_in() -> Self {
        Self::roles(&[])
    }

    pub const fn public() -> Self {
        Self {
            allowed: &[],
            require_auth: false,
            fallback: SIGN_IN_ROUTE,
        }
    }

    pub fn decide(&self, role: Option<Role>) -> Gate {
        match role {
            None if self.require_auth => Gate::Redirect(self.fallback),
            None => Gate::Allow,
            Some(role) if !self.allowed.is_empty() && !self.allowed.contains(&role) => {
                Gate::Redirect(landing_route(Some(role)))
            }
            Some(_) => Gate::Allow,
        }
    }
}

pub const USER_PAGES: RouteAccess = RouteAccess::roles(&[Role::User]);
pub const ADMIN_PAGES: RouteAccess = RouteAccess::roles(&[Role::Admin]);
pub const SUPER_USER_PAGES: RouteAccess = RouteAccess::roles(&[Role::SuperUser]);
/// Roster pages are shared by admins and super users.
pub const STAFF_PAGES: RouteAccess = RouteAccess::roles(&[Role::Admin, Role::SuperUser]);
pub const ANY_SIGNED_IN: RouteAccess = RouteAccess::signed_in();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_backend_wire_names() {
        let role: Role = serde_json::from_str("\"SUPER_USER\"").unwrap();
        assert_eq!(role, Role::SuperUser);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn public_routes_admit_everyone() {
        let access = RouteAccess::public();
        assert_eq!(access.decide(None), Gate::Allow);
        assert_eq!(access.decide(Some(Role::User)), Gate::Allow);
    }
}
