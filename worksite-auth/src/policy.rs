// SPDX-License-Identifier: MIT OR Apache-2.0

//! The access-control matrix and its evaluation engine.
//!
//! The matrix is plain data: one [`AccessLevel`] for every combination of
//! resource, action and role. It is written below as one function per
//! resource, each an exhaustive `match` over actions with one level per
//! role — leaving a cell out is a compile error, so the table can never be
//! partially populated. [`Policy::new`] materializes the functions into a
//! flat lookup map which is built once per process and never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::trace;

use crate::access::{AccessLevel, PermissionContext};
use crate::types::{Action, Resource, Role};

static POLICY: LazyLock<Policy> = LazyLock::new(Policy::new);

/// The process-wide policy, built on first use.
pub fn policy() -> &'static Policy {
    &POLICY
}

/// The materialized access-control matrix.
///
/// Decisions are pure: no I/O, no identity lookups, no side effects beyond a
/// trace event. Lookups fail closed — a combination absent from the table
/// denies access rather than granting it.
#[derive(Clone, Debug)]
pub struct Policy {
    table: HashMap<(Resource, Action, Role), AccessLevel>,
}

impl Policy {
    /// Build the matrix. Covers the full Cartesian product of
    /// [`Resource::ALL`] × [`Action::ALL`] × [`Role::ALL`].
    pub fn new() -> Self {
        let mut table =
            HashMap::with_capacity(Resource::ALL.len() * Action::ALL.len() * Role::ALL.len());

        for resource in Resource::ALL {
            for action in Action::ALL {
                for role in Role::ALL {
                    table.insert((resource, action, role), level_for(resource, action, role));
                }
            }
        }

        Self { table }
    }

    /// The matrix cell for a combination.
    ///
    /// Exposed so callers can distinguish "disabled" from "conditionally
    /// available" controls. An absent cell resolves to [`AccessLevel::No`].
    pub fn level(&self, resource: Resource, action: Action, role: Role) -> AccessLevel {
        self.table
            .get(&(resource, action, role))
            .copied()
            .unwrap_or(AccessLevel::No)
    }

    /// Decide whether `role` may perform `action` on `resource`, given the
    /// caller-computed relationship context.
    pub fn can_perform(
        &self,
        action: Action,
        resource: Resource,
        role: Role,
        context: &PermissionContext,
    ) -> bool {
        let level = self.level(resource, action, role);
        let allowed = level.grants(context);
        trace!(%resource, %action, %role, %level, allowed, "permission decision");
        allowed
    }

    /// `can_perform` with the action bound to [`Action::View`].
    pub fn can_view(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::View, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Create`].
    pub fn can_create(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Create, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Edit`].
    pub fn can_edit(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Edit, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Delete`].
    pub fn can_delete(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Delete, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Upload`].
    pub fn can_upload(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Upload, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Approve`].
    pub fn can_approve(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Approve, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Pay`].
    pub fn can_pay(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Pay, resource, role, context)
    }

    /// `can_perform` with the action bound to [`Action::Close`].
    pub fn can_close(&self, resource: Resource, role: Role, context: &PermissionContext) -> bool {
        self.can_perform(Action::Close, resource, role, context)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

fn level_for(resource: Resource, action: Action, role: Role) -> AccessLevel {
    match resource {
        Resource::Users => users(action, role),
        Resource::Vendors => vendors(action, role),
        Resource::Projects => projects(action, role),
        Resource::VendorDocuments => vendor_documents(action, role),
        Resource::Tickets => tickets(action, role),
        Resource::TicketDocuments => ticket_documents(action, role),
        Resource::Bills => bills(action, role),
        Resource::AdHocPayments => ad_hoc_payments(action, role),
    }
}

/// Pick the level for a role. Argument order: admin, supervisor, finance,
/// vendor, user.
fn by_role(
    role: Role,
    admin: AccessLevel,
    supervisor: AccessLevel,
    finance: AccessLevel,
    vendor: AccessLevel,
    user: AccessLevel,
) -> AccessLevel {
    match role {
        Role::Admin => admin,
        Role::Supervisor => supervisor,
        Role::Finance => finance,
        Role::Vendor => vendor,
        Role::User => user,
    }
}

fn users(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, No, No, OwnProfile),
        Action::Create => by_role(role, Yes, No, No, SelfRegister, SelfRegister),
        Action::Edit => by_role(role, All, No, No, OwnProfile, OwnProfile),
        Action::Delete => by_role(role, All, No, No, No, No),
        Action::Upload => by_role(role, Yes, No, No, No, No),
        Action::Approve => by_role(role, Yes, No, No, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, No, No, No, No, No),
    }
}

fn vendors(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, All, All, Own, No),
        Action::Create => by_role(role, Yes, Yes, No, SelfRegister, No),
        Action::Edit => by_role(role, All, No, No, Own, No),
        Action::Delete => by_role(role, All, No, No, No, No),
        Action::Upload => by_role(role, Yes, No, No, Own, No),
        Action::Approve => by_role(role, Yes, No, Yes, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, Yes, No, No, No, No),
    }
}

fn projects(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Own, All, Assigned, Team),
        Action::Create => by_role(role, Yes, Yes, No, No, No),
        Action::Edit => by_role(role, All, Yes, No, No, No),
        Action::Delete => by_role(role, All, Own, No, No, No),
        Action::Upload => by_role(role, Yes, Yes, No, Assigned, Team),
        Action::Approve => by_role(role, Yes, No, No, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, Yes, Own, No, No, No),
    }
}

fn vendor_documents(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, All, Own, No),
        Action::Create => by_role(role, Yes, No, No, Own, No),
        Action::Edit => by_role(role, All, No, No, Own, No),
        Action::Delete => by_role(role, All, No, No, Own, No),
        Action::Upload => by_role(role, Yes, No, No, Own, No),
        Action::Approve => by_role(role, Yes, No, Yes, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, No, No, No, No, No),
    }
}

fn tickets(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, No, Assigned, Own),
        Action::Create => by_role(role, Yes, Yes, No, No, Yes),
        Action::Edit => by_role(role, All, Team, No, Assigned, Own),
        Action::Delete => by_role(role, All, Team, No, No, No),
        Action::Upload => by_role(role, Yes, Team, No, Assigned, Own),
        Action::Approve => by_role(role, Yes, Team, No, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, Yes, Team, No, Assigned, No),
    }
}

fn ticket_documents(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, No, Assigned, Own),
        Action::Create => by_role(role, Yes, Team, No, Assigned, Own),
        Action::Edit => by_role(role, All, No, No, No, No),
        Action::Delete => by_role(role, All, Team, No, No, No),
        Action::Upload => by_role(role, Yes, Team, No, Assigned, Own),
        Action::Approve => by_role(role, Yes, No, No, No, No),
        Action::Pay => by_role(role, No, No, No, No, No),
        Action::Close => by_role(role, No, No, No, No, No),
    }
}

fn bills(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, All, Own, No),
        Action::Create => by_role(role, Yes, No, Yes, Own, No),
        Action::Edit => by_role(role, All, No, Yes, Own, No),
        Action::Delete => by_role(role, All, No, Yes, No, No),
        Action::Upload => by_role(role, Yes, No, Yes, Own, No),
        Action::Approve => by_role(role, Yes, Team, Yes, No, No),
        Action::Pay => by_role(role, Yes, No, Yes, No, No),
        Action::Close => by_role(role, Yes, No, Yes, No, No),
    }
}

fn ad_hoc_payments(action: Action, role: Role) -> AccessLevel {
    use AccessLevel::*;

    match action {
        Action::View => by_role(role, All, Team, All, Own, No),
        Action::Create => by_role(role, Yes, Yes, Yes, No, No),
        Action::Edit => by_role(role, All, No, Yes, No, No),
        Action::Delete => by_role(role, All, No, Yes, No, No),
        Action::Upload => by_role(role, Yes, Team, Yes, Own, No),
        Action::Approve => by_role(role, Yes, No, Yes, No, No),
        Action::Pay => by_role(role, Yes, No, Yes, No, No),
        Action::Close => by_role(role, Yes, No, Yes, No, No),
    }
}

#[cfg(test)]
mod tests {
    use crate::access::{AccessLevel, PermissionContext};
    use crate::types::{Action, Resource, Role};

    use super::{Policy, policy};

    fn full_context() -> PermissionContext {
        PermissionContext {
            is_owner: true,
            is_team_member: true,
            is_assigned: true,
            is_own_profile: true,
        }
    }

    #[test]
    fn every_cell_is_populated() {
        let policy = Policy::new();
        let mut cells = 0;

        for resource in Resource::ALL {
            for action in Action::ALL {
                for role in Role::ALL {
                    // `level` never panics and `can_perform` always resolves
                    // to a boolean for the full Cartesian product.
                    let level = policy.level(resource, action, role);
                    let decision =
                        policy.can_perform(action, resource, role, &PermissionContext::default());
                    assert_eq!(decision, level.grants(&PermissionContext::default()));
                    cells += 1;
                }
            }
        }

        assert_eq!(cells, 8 * 8 * 5);
    }

    #[test]
    fn no_cells_deny_regardless_of_context() {
        let policy = Policy::new();

        for resource in Resource::ALL {
            for action in Action::ALL {
                for role in Role::ALL {
                    if policy.level(resource, action, role) == AccessLevel::No {
                        assert!(!policy.can_perform(action, resource, role, &full_context()));
                    }
                }
            }
        }
    }

    #[test]
    fn unconditional_cells_ignore_context() {
        let policy = Policy::new();

        for resource in Resource::ALL {
            for action in Action::ALL {
                for role in Role::ALL {
                    let level = policy.level(resource, action, role);
                    if level.is_unconditional() && level != AccessLevel::No {
                        assert!(policy.can_perform(
                            action,
                            resource,
                            role,
                            &PermissionContext::default()
                        ));
                        assert!(policy.can_perform(action, resource, role, &full_context()));
                    }
                }
            }
        }
    }

    #[test]
    fn own_gated_cell_round_trips() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Bills, Action::View, Role::Vendor),
            AccessLevel::Own
        );

        assert!(policy.can_view(Resource::Bills, Role::Vendor, &PermissionContext::owner()));
        assert!(!policy.can_view(Resource::Bills, Role::Vendor, &PermissionContext::default()));
        // A non-matching flag does not satisfy an `own` cell.
        assert!(!policy.can_view(
            Resource::Bills,
            Role::Vendor,
            &PermissionContext::team_member()
        ));
    }

    #[test]
    fn assigned_gated_cell_round_trips() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Tickets, Action::View, Role::Vendor),
            AccessLevel::Assigned
        );

        assert!(policy.can_view(
            Resource::Tickets,
            Role::Vendor,
            &PermissionContext::assigned()
        ));
        assert!(!policy.can_view(Resource::Tickets, Role::Vendor, &PermissionContext::default()));
    }

    #[test]
    fn team_gated_cell_round_trips() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Projects, Action::View, Role::User),
            AccessLevel::Team
        );

        assert!(policy.can_view(
            Resource::Projects,
            Role::User,
            &PermissionContext::team_member()
        ));
        assert!(!policy.can_view(Resource::Projects, Role::User, &PermissionContext::default()));
    }

    #[test]
    fn own_profile_gated_cell_round_trips() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Users, Action::Edit, Role::User),
            AccessLevel::OwnProfile
        );

        assert!(policy.can_edit(
            Resource::Users,
            Role::User,
            &PermissionContext::own_profile()
        ));
        assert!(!policy.can_edit(Resource::Users, Role::User, &PermissionContext::default()));
    }

    #[test]
    fn supervisors_edit_projects_unconditionally() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Projects, Action::Edit, Role::Supervisor),
            AccessLevel::Yes
        );
        assert!(policy.can_edit(
            Resource::Projects,
            Role::Supervisor,
            &PermissionContext::default()
        ));
    }

    #[test]
    fn self_registration_is_open() {
        let policy = policy();
        assert_eq!(
            policy.level(Resource::Users, Action::Create, Role::User),
            AccessLevel::SelfRegister
        );
        assert!(policy.can_create(Resource::Users, Role::User, &PermissionContext::default()));
        assert!(policy.can_create(Resource::Users, Role::Vendor, &PermissionContext::default()));
    }

    #[test]
    fn action_bound_wrappers_forward() {
        let policy = policy();
        let context = PermissionContext::default();

        assert_eq!(
            policy.can_pay(Resource::Bills, Role::Finance, &context),
            policy.can_perform(Action::Pay, Resource::Bills, Role::Finance, &context)
        );
        assert_eq!(
            policy.can_approve(Resource::Vendors, Role::Finance, &context),
            policy.can_perform(Action::Approve, Resource::Vendors, Role::Finance, &context)
        );
        assert_eq!(
            policy.can_close(Resource::Tickets, Role::Admin, &context),
            policy.can_perform(Action::Close, Resource::Tickets, Role::Admin, &context)
        );
        assert_eq!(
            policy.can_upload(Resource::Projects, Role::User, &context),
            policy.can_perform(Action::Upload, Resource::Projects, Role::User, &context)
        );
        assert_eq!(
            policy.can_delete(Resource::Users, Role::Admin, &context),
            policy.can_perform(Action::Delete, Resource::Users, Role::Admin, &context)
        );
    }

    #[test]
    fn admins_never_bypass_meaningless_cells() {
        let policy = policy();

        // Verbs with no business meaning on a resource stay closed for
        // every role, admin included.
        assert!(!policy.can_pay(Resource::Users, Role::Admin, &full_context()));
        assert!(!policy.can_close(Resource::Users, Role::Admin, &full_context()));
        assert!(!policy.can_pay(Resource::Projects, Role::Admin, &full_context()));
    }
}
