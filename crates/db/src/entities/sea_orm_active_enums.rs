//! Enum columns, stored as strings.
//!
//! Each enum mirrors a domain type and converts to and from it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use leavedesk_core::leave::{LeaveStatus, LeaveType};
use leavedesk_shared::Role;

/// `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "employee")]
    Employee,
}

/// `leaves.leave_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum LeaveKind {
    #[sea_orm(string_value = "Congé payé")]
    Paid,
    #[sea_orm(string_value = "Congé maladie")]
    Sick,
    #[sea_orm(string_value = "Congé sans solde")]
    Unpaid,
}

/// `leaves.status` and `permissions.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RequestStatus {
    #[sea_orm(string_value = "En attente")]
    Pending,
    #[sea_orm(string_value = "Approuvé")]
    Approved,
    #[sea_orm(string_value = "Rejeté")]
    Rejected,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Employee => Self::Employee,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Employee => Self::Employee,
        }
    }
}

impl From<LeaveType> for LeaveKind {
    fn from(leave_type: LeaveType) -> Self {
        match leave_type {
            LeaveType::Paid => Self::Paid,
            LeaveType::Sick => Self::Sick,
            LeaveType::Unpaid => Self::Unpaid,
        }
    }
}

impl From<LeaveKind> for LeaveType {
    fn from(kind: LeaveKind) -> Self {
        match kind {
            LeaveKind::Paid => Self::Paid,
            LeaveKind::Sick => Self::Sick,
            LeaveKind::Unpaid => Self::Unpaid,
        }
    }
}

impl From<LeaveStatus> for RequestStatus {
    fn from(status: LeaveStatus) -> Self {
        match status {
            LeaveStatus::Pending => Self::Pending,
            LeaveStatus::Approved => Self::Approved,
            LeaveStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<RequestStatus> for LeaveStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LeaveType::Paid)]
    #[case(LeaveType::Sick)]
    #[case(LeaveType::Unpaid)]
    fn test_leave_kind_stores_wire_name(#[case] leave_type: LeaveType) {
        let kind = LeaveKind::from(leave_type);
        assert_eq!(kind.to_value(), leave_type.as_str());
        assert_eq!(LeaveType::from(kind), leave_type);
    }

    #[rstest]
    #[case(LeaveStatus::Pending)]
    #[case(LeaveStatus::Approved)]
    #[case(LeaveStatus::Rejected)]
    fn test_request_status_stores_wire_name(#[case] status: LeaveStatus) {
        let stored = RequestStatus::from(status);
        assert_eq!(stored.to_value(), status.as_str());
        assert_eq!(LeaveStatus::from(stored), status);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from(Role::Admin).to_value(), "admin");
        assert_eq!(Role::from(UserRole::Employee), Role::Employee);
    }
}
