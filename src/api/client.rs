use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{
        Assignment, CreateAssignmentInput, OrderStaffCosts, SuggestStaffQuery, SuggestionResponse,
        UpdateAssignmentInput,
    },
    AppResult,
};

/// The REST contract the staffing views consume.
///
/// Conflict detection, scoring and persistence all live behind this trait.
#[async_trait]
pub trait StaffingApi: Send + Sync {
    /// `GET /orders/{order_id}/suggest-staff`
    async fn suggest_staff(&self, order_id: Uuid, query: &SuggestStaffQuery) -> AppResult<SuggestionResponse>;

    /// `GET /orders/{order_id}/staff-costs`
    async fn order_staff_costs(&self, order_id: Uuid) -> AppResult<OrderStaffCosts>;

    /// `POST /hr/assignments`
    async fn create_assignment(&self, input: &CreateAssignmentInput) -> AppResult<Assignment>;

    /// `PUT /hr/assignments/{assignment_id}`
    async fn update_assignment(&self, assignment_id: Uuid, input: &UpdateAssignmentInput) -> AppResult<Assignment>;

    /// `DELETE /hr/assignments/{assignment_id}`
    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()>;
}
