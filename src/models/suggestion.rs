use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StaffRole;

/// A ranked staffing proposal. Read-only; never persisted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub role_type: StaffRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_fulltime: bool,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub current_workload: u32,
    pub is_available: bool,
    #[serde(default)]
    pub score: f64,
    /// Present only when `is_available` is false.
    #[serde(default)]
    pub conflict_reason: Option<String>,
}

/// Response of `GET /orders/{id}/suggest-staff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub order_id: Uuid,
    #[serde(default)]
    pub order_code: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    /// Wall-clock start, `HH:MM` or `HH:MM:SS`.
    #[serde(default)]
    pub event_time: Option<String>,
    #[serde(default)]
    pub required_roles: Vec<StaffRole>,
    #[serde(default)]
    pub suggestions: Vec<SuggestionCandidate>,
    #[serde(default)]
    pub total_available: u32,
}

impl SuggestionResponse {
    pub fn candidate(&self, employee_id: Uuid) -> Option<&SuggestionCandidate> {
        self.suggestions.iter().find(|c| c.employee_id == employee_id)
    }
}

/// Query string for the suggest-staff endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestStaffQuery {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_filter: Option<StaffRole>,
}
