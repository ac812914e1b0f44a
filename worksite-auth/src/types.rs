// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Actor classification. Immutable once assigned to an actor; changing it is
/// an administrative concern outside this crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Finance,
    Vendor,
    User,
}

impl Role {
    /// Every role, for exhaustive iteration over the policy matrix.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Supervisor,
        Role::Finance,
        Role::Vendor,
        Role::User,
    ];
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Finance => "finance",
            Role::Vendor => "vendor",
            Role::User => "user",
        };

        write!(f, "{}", s)
    }
}

/// Object-kind tag selecting a row family of the policy matrix.
///
/// Deliberately broader than the project aggregate: the matrix governs a
/// whole family of resources, of which projects are the one with deep
/// nested structure.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Users,
    Vendors,
    Projects,
    VendorDocuments,
    Tickets,
    TicketDocuments,
    Bills,
    AdHocPayments,
}

impl Resource {
    /// Every resource, for exhaustive iteration over the policy matrix.
    pub const ALL: [Resource; 8] = [
        Resource::Users,
        Resource::Vendors,
        Resource::Projects,
        Resource::VendorDocuments,
        Resource::Tickets,
        Resource::TicketDocuments,
        Resource::Bills,
        Resource::AdHocPayments,
    ];
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Resource::Users => "users",
            Resource::Vendors => "vendors",
            Resource::Projects => "projects",
            Resource::VendorDocuments => "vendorDocuments",
            Resource::Tickets => "tickets",
            Resource::TicketDocuments => "ticketDocuments",
            Resource::Bills => "bills",
            Resource::AdHocPayments => "adHocPayments",
        };

        write!(f, "{}", s)
    }
}

/// Verb an actor attempts against a resource.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Upload,
    Approve,
    Pay,
    Close,
}

impl Action {
    /// Every action, for exhaustive iteration over the policy matrix.
    pub const ALL: [Action; 8] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Upload,
        Action::Approve,
        Action::Pay,
        Action::Close,
    ];
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Upload => "upload",
            Action::Approve => "approve",
            Action::Pay => "pay",
            Action::Close => "close",
        };

        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Resource, Role};

    #[test]
    fn serde_labels_round_trip() {
        let resource: Resource = serde_json::from_str("\"adHocPayments\"").expect("deserializes");
        assert_eq!(resource, Resource::AdHocPayments);
        assert_eq!(
            serde_json::to_string(&Resource::VendorDocuments).expect("serializes"),
            "\"vendorDocuments\""
        );

        let role: Role = serde_json::from_str("\"supervisor\"").expect("deserializes");
        assert_eq!(role, Role::Supervisor);

        let action: Action = serde_json::from_str("\"upload\"").expect("deserializes");
        assert_eq!(action, Action::Upload);
    }

    #[test]
    fn display_matches_wire_labels() {
        assert_eq!(Resource::AdHocPayments.to_string(), "adHocPayments");
        assert_eq!(Role::Finance.to_string(), "finance");
        assert_eq!(Action::Close.to_string(), "close");
    }
}
