//! Leave domain types.
//!
//! Wire values are the French labels clients display, e.g. `"Congé payé"`
//! and `"En attente"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of leave, deciding which balance pool an approval draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    /// Paid leave, drawn from carried-over then current-year paid days.
    #[serde(rename = "Congé payé")]
    Paid,
    /// Sick leave, drawn from the sick pool.
    #[serde(rename = "Congé maladie")]
    Sick,
    /// Unpaid leave, no balance effect.
    #[serde(rename = "Congé sans solde")]
    Unpaid,
}

impl LeaveType {
    /// All leave types.
    pub const ALL: [Self; 3] = [Self::Paid, Self::Sick, Self::Unpaid];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Congé payé",
            Self::Sick => "Congé maladie",
            Self::Unpaid => "Congé sans solde",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.trim())
    }

    /// Returns true if approving this type deducts from a balance.
    #[must_use]
    pub const fn deducts_balance(&self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status shared by leaves and permissions.
///
/// The only transitions are `Pending -> Approved` and `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveStatus {
    /// Awaiting an admin decision.
    #[default]
    #[serde(rename = "En attente")]
    Pending,
    /// Approved by an admin.
    #[serde(rename = "Approuvé")]
    Approved,
    /// Rejected by an admin.
    #[serde(rename = "Rejeté")]
    Rejected,
}

impl LeaveStatus {
    /// All statuses.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Approved => "Approuvé",
            Self::Rejected => "Rejeté",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s.trim())
    }

    /// Returns true while the request may still be edited by its owner.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
