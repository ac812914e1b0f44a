// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role-based permission evaluation for worksite.
//!
//! Access decisions are made against a static matrix mapping every
//! `(resource, action, role)` combination to an [`AccessLevel`]. Levels are
//! either unconditional (granted or denied outright) or gated on a
//! relationship between the actor and the resource — ownership, team
//! membership, assignment — which the caller supplies as a
//! [`PermissionContext`] at decision time.
//!
//! The engine performs no identity lookups and no I/O of its own: callers
//! compute the relationship flags from their own data (for example "does
//! `project.team` contain the current actor id?") before asking for a
//! decision.
//!
//! ```
//! use worksite_auth::{Action, PermissionContext, Resource, Role, policy};
//!
//! let context = PermissionContext::assigned();
//! assert!(policy().can_perform(Action::View, Resource::Tickets, Role::Vendor, &context));
//! assert!(!policy().can_perform(
//!     Action::View,
//!     Resource::Tickets,
//!     Role::Vendor,
//!     &PermissionContext::default(),
//! ));
//! ```

mod access;
mod policy;
mod types;

pub use access::{AccessLevel, PermissionContext};
pub use policy::{Policy, policy};
pub use types::{Action, Resource, Role};
