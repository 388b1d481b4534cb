use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{timestamp, AssignmentStatus, StaffRole};
use crate::schedule;

/// One employee booked onto one order for one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[serde(alias = "order_id")]
    pub event_id: Uuid,
    #[serde(default)]
    pub employee_name: String,
    #[serde(alias = "role_type")]
    pub role: StaffRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_hours: f64,
    /// Snapshot of the employee's rate at assignment time.
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn is_scheduled(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Always derived from the window; 0 when unscheduled or inverted.
    pub fn planned_hours(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => schedule::hours_between_timestamps(start, end),
            _ => 0.0,
        }
    }

    /// Local estimate; `cost` from the backend is authoritative.
    pub fn estimated_cost(&self) -> f64 {
        schedule::estimated_cost(self.planned_hours(), self.hourly_rate)
    }
}

/// Aggregate returned by `GET /orders/{id}/staff-costs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStaffCosts {
    pub order_id: Uuid,
    #[serde(default)]
    pub order_code: String,
    #[serde(default)]
    pub total_staff_cost: f64,
    #[serde(default)]
    pub total_planned_hours: f64,
    #[serde(default)]
    pub total_actual_hours: f64,
    #[serde(default)]
    pub staff_count: u32,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}
