// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The resolved policy value for a single `(resource, action, role)` cell of
/// the access-control matrix.
///
/// Levels come in two kinds: unconditional ones which grant or deny outright,
/// and gated ones which grant only when the caller asserts a matching
/// relationship flag in the [`PermissionContext`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    /// Unconditionally permitted, for actions spanning every instance of a
    /// resource.
    All,

    /// Unconditionally permitted.
    Yes,

    /// Permitted only for team members of the resource.
    Team,

    /// Permitted only for the owner of the resource.
    Own,

    /// Permitted only for actors assigned to the resource.
    Assigned,

    /// Unconditionally permitted; models public self-registration.
    SelfRegister,

    /// Permitted only against the actor's own profile.
    OwnProfile,

    /// Never permitted.
    No,
}

impl AccessLevel {
    /// Resolve this level to a decision given the caller-supplied
    /// relationship context.
    pub fn grants(&self, context: &PermissionContext) -> bool {
        match self {
            AccessLevel::All | AccessLevel::Yes | AccessLevel::SelfRegister => true,
            AccessLevel::Team => context.is_team_member,
            AccessLevel::Own => context.is_owner,
            AccessLevel::Assigned => context.is_assigned,
            AccessLevel::OwnProfile => context.is_own_profile,
            AccessLevel::No => false,
        }
    }

    /// Return `true` if this level ignores the context entirely.
    pub fn is_unconditional(&self) -> bool {
        matches!(
            self,
            AccessLevel::All | AccessLevel::Yes | AccessLevel::SelfRegister | AccessLevel::No
        )
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessLevel::All => "all",
            AccessLevel::Yes => "yes",
            AccessLevel::Team => "team",
            AccessLevel::Own => "own",
            AccessLevel::Assigned => "assigned",
            AccessLevel::SelfRegister => "self-register",
            AccessLevel::OwnProfile => "own-profile",
            AccessLevel::No => "no",
        };

        write!(f, "{}", s)
    }
}

/// Relationship flags between an actor and the resource under decision,
/// computed by the caller before asking for a decision.
///
/// Absent flags are treated as false: a default context matches only
/// unconditional levels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PermissionContext {
    pub is_owner: bool,
    pub is_team_member: bool,
    pub is_assigned: bool,
    pub is_own_profile: bool,
}

impl PermissionContext {
    /// Context asserting ownership of the resource.
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            ..Self::default()
        }
    }

    /// Context asserting team membership.
    pub fn team_member() -> Self {
        Self {
            is_team_member: true,
            ..Self::default()
        }
    }

    /// Context asserting assignment to the resource.
    pub fn assigned() -> Self {
        Self {
            is_assigned: true,
            ..Self::default()
        }
    }

    /// Context asserting the resource is the actor's own profile.
    pub fn own_profile() -> Self {
        Self {
            is_own_profile: true,
            ..Self::default()
        }
    }
}
