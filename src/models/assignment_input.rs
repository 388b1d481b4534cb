use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StaffRole;

/// Body of `POST /hr/assignments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAssignmentInput {
    pub event_id: Uuid,
    pub employee_id: Uuid,
    pub role: StaffRole,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Body of `PUT /hr/assignments/{id}`; only the window is editable here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssignmentInput {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
