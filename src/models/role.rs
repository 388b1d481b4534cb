use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role on an event. Serialized as the backend's upper-case codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Chef,
    Waiter,
    Driver,
    Kitchen,
    Captain,
    Lead,
    Staff,
    Manager,
}

impl StaffRole {
    pub const ALL: [StaffRole; 8] = [
        StaffRole::Chef,
        StaffRole::Waiter,
        StaffRole::Driver,
        StaffRole::Kitchen,
        StaffRole::Captain,
        StaffRole::Lead,
        StaffRole::Staff,
        StaffRole::Manager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Chef => "CHEF",
            StaffRole::Waiter => "WAITER",
            StaffRole::Driver => "DRIVER",
            StaffRole::Kitchen => "KITCHEN",
            StaffRole::Captain => "CAPTAIN",
            StaffRole::Lead => "LEAD",
            StaffRole::Staff => "STAFF",
            StaffRole::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        StaffRole::ALL
            .into_iter()
            .find(|role| role.as_str() == upper)
            .ok_or_else(|| format!("Unknown staff role: {}", s))
    }
}

/// Lifecycle of an assignment. The backend owns every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Assigned,
    Confirmed,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Cancelled)
    }

    /// PENDING/ASSIGNED -> CONFIRMED -> COMPLETED, or CANCELLED from anything
    /// that is not yet terminal.
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;

        match (self, next) {
            (Pending, Assigned) => true,
            (Pending | Assigned, Confirmed) => true,
            (Confirmed, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}
