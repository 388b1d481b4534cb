//! Staff already assigned to an order, with inline window editing and
//! two-step deletion.

use std::sync::Arc;
use uuid::Uuid;

use super::{Completed, Notification, PendingRequest};
use crate::{
    models::{Assignment, OrderStaffCosts, UpdateAssignmentInput},
    schedule::{self, WindowDraft},
    StaffingService,
};

/// Editable copy of one row's window.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub assignment_id: Uuid,
    pub hourly_rate: f64,
    pub draft: WindowDraft,
    /// Last failure for this buffer, shown inline.
    pub error: Option<Notification>,
}

impl EditBuffer {
    pub fn hours(&self) -> f64 {
        self.draft.hours()
    }

    pub fn estimated_cost(&self) -> f64 {
        self.draft.estimated_cost(self.hourly_rate)
    }
}

/// At most one row is ever editable.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditBuffer),
    /// Update in flight; inputs are disabled.
    Submitting(EditBuffer),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub assignment_id: Uuid,
    pub employee_name: String,
    pub error: Option<Notification>,
}

/// Independent of [`EditState`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DeleteState {
    #[default]
    Closed,
    Confirming(DeleteTarget),
    Deleting(DeleteTarget),
}

pub struct AssignmentListView {
    order_id: Uuid,
    service: Arc<StaffingService>,
    rows: Arc<Vec<Assignment>>,
    summary: Option<Arc<OrderStaffCosts>>,
    edit: EditState,
    delete: DeleteState,
}

impl AssignmentListView {
    pub fn new(service: Arc<StaffingService>, order_id: Uuid) -> Self {
        Self {
            order_id,
            service,
            rows: Arc::new(Vec::new()),
            summary: None,
            edit: EditState::Idle,
            delete: DeleteState::Closed,
        }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    /// Fetch the rows and the order's cost summary.
    pub async fn load(&mut self) -> Result<(), Notification> {
        let rows = self
            .service
            .assignments(self.order_id)
            .await
            .map_err(|e| Notification::from_error("load assigned staff", &e))?;
        let summary = self
            .service
            .staff_costs(self.order_id)
            .await
            .map_err(|e| Notification::from_error("load staff costs", &e))?;

        self.rows = rows;
        self.summary = Some(summary);
        Ok(())
    }

    /// Reload after a committed write. The write already succeeded, so a
    /// failed reload only leaves stale rows until the next load.
    async fn refresh_after_mutation(&mut self) {
        if let Err(notification) = self.load().await {
            tracing::warn!(order_id = %self.order_id, error = %notification, "Failed to refresh assignments after update");
        }
    }

    pub fn rows(&self) -> &[Assignment] {
        &self.rows
    }

    pub fn summary(&self) -> Option<&OrderStaffCosts> {
        self.summary.as_deref()
    }

    pub fn row(&self, assignment_id: Uuid) -> Option<&Assignment> {
        self.rows.iter().find(|a| a.id == assignment_id)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn delete_state(&self) -> &DeleteState {
        &self.delete
    }

    pub fn editing_id(&self) -> Option<Uuid> {
        match &self.edit {
            EditState::Editing(buffer) | EditState::Submitting(buffer) => Some(buffer.assignment_id),
            EditState::Idle => None,
        }
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        match &self.edit {
            EditState::Editing(buffer) | EditState::Submitting(buffer) => Some(buffer),
            EditState::Idle => None,
        }
    }

    /// Open a row for editing, closing whichever row was open. Rows with no
    /// window yet are seeded with today, 08:00-16:00.
    ///
    /// Returns false for unknown rows, while an update is in flight and for
    /// a row that is being deleted.
    pub fn start_edit(&mut self, assignment_id: Uuid) -> bool {
        if matches!(self.edit, EditState::Submitting(_)) {
            return false;
        }
        if matches!(&self.delete, DeleteState::Deleting(target) if target.assignment_id == assignment_id) {
            return false;
        }
        let Some(assignment) = self.row(assignment_id) else {
            return false;
        };

        let hourly_rate = assignment.hourly_rate;
        let tz = self.service.utc_offset();
        let draft = match (assignment.start_time, assignment.end_time) {
            (Some(start), Some(end)) => {
                let (date, start) = schedule::split_local(start, &tz);
                let (_, end) = schedule::split_local(end, &tz);
                WindowDraft::new(date, start, end)
            }
            _ => WindowDraft::standard_shift(schedule::today_in(&tz)),
        };

        if let Some(previous) = self.editing_id() {
            tracing::debug!(%previous, next = %assignment_id, "Switching edited assignment");
        }

        self.edit = EditState::Editing(EditBuffer {
            assignment_id,
            hourly_rate,
            draft,
            error: None,
        });
        true
    }

    fn editing_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match &mut self.edit {
            EditState::Editing(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn set_edit_date(&mut self, date: &str) {
        if let Some(buffer) = self.editing_buffer_mut() {
            buffer.draft.date = date.to_string();
        }
    }

    pub fn set_edit_start(&mut self, start: &str) {
        if let Some(buffer) = self.editing_buffer_mut() {
            buffer.draft.start = start.to_string();
        }
    }

    pub fn set_edit_end(&mut self, end: &str) {
        if let Some(buffer) = self.editing_buffer_mut() {
            buffer.draft.end = end.to_string();
        }
    }

    /// Drives the enabled state of the save control.
    pub fn can_submit_edit(&self) -> bool {
        match &self.edit {
            EditState::Editing(buffer) => buffer.draft.is_submittable(&self.service.utc_offset()),
            _ => false,
        }
    }

    /// Discard the buffer without touching the backend.
    pub fn cancel_edit(&mut self) {
        if matches!(self.edit, EditState::Editing(_)) {
            self.edit = EditState::Idle;
        }
    }

    /// Save the open row's window in one go. See [`Self::begin_submit_edit`]
    /// for the split form that leaves the view usable while the request runs.
    pub async fn submit_edit(&mut self) -> Result<Assignment, Notification> {
        let pending = self.begin_submit_edit()?;
        let completed = pending.send().await;
        self.finish_submit_edit(completed).await
    }

    /// Validate the open row and move it to `Submitting`.
    ///
    /// Invalid windows are rejected without a request and the row stays open
    /// with the error attached.
    pub fn begin_submit_edit(&mut self) -> Result<PendingRequest<Assignment>, Notification> {
        let mut buffer = match std::mem::take(&mut self.edit) {
            EditState::Editing(buffer) => buffer,
            other => {
                self.edit = other;
                return Err(Notification::validation("No assignment is being edited"));
            }
        };

        let window = match buffer.draft.resolve(&self.service.utc_offset()) {
            Ok(window) => window,
            Err(e) => {
                let notification = Notification::from_error("save the assignment", &e);
                buffer.error = Some(notification.clone());
                self.edit = EditState::Editing(buffer);
                return Err(notification);
            }
        };

        let assignment_id = buffer.assignment_id;
        let input = UpdateAssignmentInput {
            start_time: window.start_at,
            end_time: window.end_at,
        };

        buffer.error = None;
        self.edit = EditState::Submitting(buffer);

        let service = self.service.clone();
        let order_id = self.order_id;
        Ok(PendingRequest::new(assignment_id, async move {
            service.update_assignment(order_id, assignment_id, &input).await
        }))
    }

    /// Apply the backend's answer. On failure the row goes back to `Editing`
    /// with its input intact and the error attached.
    pub async fn finish_submit_edit(&mut self, completed: Completed<Assignment>) -> Result<Assignment, Notification> {
        let assignment_id = completed.target();
        let submitting = matches!(&self.edit, EditState::Submitting(buffer) if buffer.assignment_id == assignment_id);

        match completed.into_result() {
            Ok(updated) => {
                if submitting {
                    self.edit = EditState::Idle;
                }
                self.refresh_after_mutation().await;
                Ok(updated)
            }
            Err(e) => {
                let notification = Notification::from_error("update the assignment", &e);
                if submitting {
                    if let EditState::Submitting(mut buffer) = std::mem::take(&mut self.edit) {
                        buffer.error = Some(notification.clone());
                        self.edit = EditState::Editing(buffer);
                    }
                }
                Err(notification)
            }
        }
    }

    /// First step of removal. Replaces any other pending confirmation.
    /// Refused while a delete is in flight or the row's own update is.
    pub fn request_delete(&mut self, assignment_id: Uuid) -> bool {
        if matches!(self.delete, DeleteState::Deleting(_)) {
            return false;
        }
        if matches!(&self.edit, EditState::Submitting(buffer) if buffer.assignment_id == assignment_id) {
            return false;
        }
        let Some(assignment) = self.row(assignment_id) else {
            return false;
        };

        let employee_name = assignment.employee_name.clone();

        self.delete = DeleteState::Confirming(DeleteTarget {
            assignment_id,
            employee_name,
            error: None,
        });
        true
    }

    pub fn cancel_delete(&mut self) {
        if matches!(self.delete, DeleteState::Confirming(_)) {
            self.delete = DeleteState::Closed;
        }
    }

    /// Remove the confirmed record in one go (the client never cancels by
    /// status).
    pub async fn confirm_delete(&mut self) -> Result<(), Notification> {
        let pending = self.begin_delete()?;
        let completed = pending.send().await;
        self.finish_delete(completed).await
    }

    /// Move the confirmation to `Deleting` and hand out the request.
    pub fn begin_delete(&mut self) -> Result<PendingRequest<()>, Notification> {
        let mut target = match std::mem::take(&mut self.delete) {
            DeleteState::Confirming(target) => target,
            other => {
                self.delete = other;
                return Err(Notification::validation("No assignment is awaiting deletion"));
            }
        };

        let assignment_id = target.assignment_id;
        target.error = None;
        self.delete = DeleteState::Deleting(target);

        let service = self.service.clone();
        let order_id = self.order_id;
        Ok(PendingRequest::new(assignment_id, async move {
            service.delete_assignment(order_id, assignment_id).await
        }))
    }

    /// On failure the confirmation reopens with the error attached. On
    /// success an edit left open on the same row is discarded.
    pub async fn finish_delete(&mut self, completed: Completed<()>) -> Result<(), Notification> {
        let assignment_id = completed.target();
        let deleting = matches!(&self.delete, DeleteState::Deleting(target) if target.assignment_id == assignment_id);

        match completed.into_result() {
            Ok(()) => {
                if deleting {
                    self.delete = DeleteState::Closed;
                }
                if matches!(&self.edit, EditState::Editing(buffer) if buffer.assignment_id == assignment_id) {
                    self.edit = EditState::Idle;
                }
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                let notification = Notification::from_error("remove the staff member", &e);
                if deleting {
                    if let DeleteState::Deleting(mut target) = std::mem::take(&mut self.delete) {
                        target.error = Some(notification.clone());
                        self.delete = DeleteState::Confirming(target);
                    }
                }
                Err(notification)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, Call, Failure};
    use crate::views::{NotificationKind, CONFLICT_MESSAGE};

    async fn loaded_view() -> (Arc<crate::testing::FakeStaffingApi>, AssignmentListView) {
        let (api, service, order_id) = fixtures::service();
        let mut view = AssignmentListView::new(service, order_id);
        view.load().await.unwrap();
        (api, view)
    }

    #[tokio::test]
    async fn test_load_exposes_rows_and_summary() {
        let (_api, view) = loaded_view().await;

        assert_eq!(view.rows().len(), 2);
        let summary = view.summary().unwrap();
        assert_eq!(summary.staff_count, 2);
        assert_eq!(summary.total_planned_hours, 4.0);
        assert_eq!(summary.total_staff_cost, 200000.0);
    }

    #[tokio::test]
    async fn test_start_edit_seeds_from_existing_window() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");

        assert!(view.start_edit(em.id));

        let buffer = view.edit_buffer().unwrap();
        assert_eq!(buffer.draft, WindowDraft::new("2024-06-15", "08:00", "12:00"));
        assert_eq!(buffer.hours(), 4.0);
        assert_eq!(buffer.estimated_cost(), 200000.0);
    }

    #[tokio::test]
    async fn test_start_edit_defaults_unscheduled_row() {
        let (api, mut view) = loaded_view().await;
        let giang = api.assignment_named("Giang");

        assert!(view.start_edit(giang.id));

        let today = schedule::today_in(&fixtures::ict());
        assert_eq!(view.edit_buffer().unwrap().draft, WindowDraft::standard_shift(today));
    }

    #[tokio::test]
    async fn test_only_one_row_is_editable() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        let giang = api.assignment_named("Giang");

        view.start_edit(em.id);
        view.set_edit_end("15:00");
        view.start_edit(giang.id);

        assert_eq!(view.editing_id(), Some(giang.id));
        assert!(!view.start_edit(Uuid::new_v4()));
        assert_eq!(view.editing_id(), Some(giang.id));
    }

    #[tokio::test]
    async fn test_cancel_edit_sends_nothing() {
        let (api, mut view) = loaded_view().await;
        view.start_edit(api.assignment_named("Em").id);
        view.set_edit_start("10:00");

        view.cancel_edit();

        assert_eq!(view.edit_state(), &EditState::Idle);
        assert_eq!(api.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_hour_edit_is_blocked_locally() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        view.start_edit(em.id);
        view.set_edit_start("09:00");
        view.set_edit_end("09:00");

        assert!(!view.can_submit_edit());
        let err = view.submit_edit().await.unwrap_err();

        assert_eq!(err.kind, NotificationKind::Validation);
        assert_eq!(api.mutation_count(), 0);
        assert_eq!(view.editing_id(), Some(em.id));
        assert_eq!(view.edit_buffer().unwrap().error.as_ref(), Some(&err));
    }

    #[tokio::test]
    async fn test_successful_edit_returns_to_idle_and_refetches() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        view.start_edit(em.id);
        view.set_edit_start("08:00");
        view.set_edit_end("16:00");

        let buffer = view.edit_buffer().unwrap();
        assert_eq!(buffer.hours(), 8.0);
        assert_eq!(buffer.estimated_cost(), 400000.0);
        assert!(view.can_submit_edit());

        let updated = view.submit_edit().await.unwrap();

        assert_eq!(updated.planned_hours(), 8.0);
        assert_eq!(view.edit_state(), &EditState::Idle);
        let staff_cost_fetches = api
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::StaffCosts(_)))
            .count();
        assert_eq!(staff_cost_fetches, 2);
        assert_eq!(view.summary().unwrap().total_planned_hours, 8.0);
        assert_eq!(view.row(em.id).unwrap().cost, 400000.0);

        let Call::Update(id, input) = api.calls().into_iter().find(|c| matches!(c, Call::Update(..))).unwrap() else {
            unreachable!()
        };
        assert_eq!(id, em.id);
        assert_eq!(input.start_time.to_rfc3339(), "2024-06-15T01:00:00+00:00");
        assert_eq!(input.end_time.to_rfc3339(), "2024-06-15T09:00:00+00:00");
    }

    #[tokio::test]
    async fn test_failed_edit_keeps_input() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        view.start_edit(em.id);
        view.set_edit_end("18:00");

        api.fail_next_update(Failure::Conflict);
        let err = view.submit_edit().await.unwrap_err();

        assert_eq!(err.message, CONFLICT_MESSAGE);
        let buffer = view.edit_buffer().unwrap();
        assert!(matches!(view.edit_state(), EditState::Editing(_)));
        assert_eq!(buffer.draft.end, "18:00");
        assert_eq!(buffer.error.as_ref(), Some(&err));

        api.fail_next_update(Failure::Server);
        let err = view.submit_edit().await.unwrap_err();
        assert_eq!(err.kind, NotificationKind::Error);
        assert!(matches!(view.edit_state(), EditState::Editing(_)));

        // same input, backend recovered
        view.submit_edit().await.unwrap();
        assert_eq!(view.edit_state(), &EditState::Idle);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");

        assert!(view.request_delete(em.id));
        assert!(matches!(view.delete_state(), DeleteState::Confirming(t) if t.employee_name == "Em"));

        view.cancel_delete();
        assert_eq!(view.delete_state(), &DeleteState::Closed);
        assert_eq!(api.mutation_count(), 0);

        assert!(view.confirm_delete().await.is_err());
        assert_eq!(api.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_row_and_closes() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        view.start_edit(em.id);

        view.request_delete(em.id);
        view.confirm_delete().await.unwrap();

        assert_eq!(view.delete_state(), &DeleteState::Closed);
        assert!(view.row(em.id).is_none());
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.summary().unwrap().staff_count, 1);
        assert_eq!(view.edit_state(), &EditState::Idle);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_confirmation_open() {
        let (api, mut view) = loaded_view().await;
        let giang = api.assignment_named("Giang");

        view.request_delete(giang.id);
        api.fail_next_delete(Failure::Server);
        let err = view.confirm_delete().await.unwrap_err();

        match view.delete_state() {
            DeleteState::Confirming(target) => {
                assert_eq!(target.assignment_id, giang.id);
                assert_eq!(target.error.as_ref(), Some(&err));
            }
            other => panic!("unexpected delete state: {:?}", other),
        }
        assert_eq!(api.assignment_count(), 2);
    }

    #[tokio::test]
    async fn test_edit_and_delete_can_be_pending_on_different_rows() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        let giang = api.assignment_named("Giang");

        view.start_edit(em.id);
        view.request_delete(giang.id);
        view.confirm_delete().await.unwrap();

        assert_eq!(view.editing_id(), Some(em.id));
        assert_eq!(view.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_update_is_visible_and_other_rows_stay_usable() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");
        let giang = api.assignment_named("Giang");

        view.start_edit(em.id);
        view.set_edit_end("16:00");
        let update = view.begin_submit_edit().unwrap();

        assert_eq!(update.target(), em.id);
        assert!(matches!(view.edit_state(), EditState::Submitting(b) if b.assignment_id == em.id));
        assert!(!view.can_submit_edit());
        assert!(!view.request_delete(em.id));
        assert!(view.begin_submit_edit().is_err());

        // a different row can be removed while Em's update is pending
        assert!(view.request_delete(giang.id));
        let delete = view.begin_delete().unwrap();
        assert!(matches!(view.delete_state(), DeleteState::Deleting(t) if t.assignment_id == giang.id));
        assert!(!view.start_edit(giang.id));
        assert_eq!(api.mutation_count(), 0);

        let (updated, deleted) = tokio::join!(update.send(), delete.send());
        assert_eq!(api.mutation_count(), 2);

        view.finish_delete(deleted).await.unwrap();
        assert_eq!(view.delete_state(), &DeleteState::Closed);
        assert!(matches!(view.edit_state(), EditState::Submitting(_)));

        view.finish_submit_edit(updated).await.unwrap();
        assert_eq!(view.edit_state(), &EditState::Idle);
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.row(em.id).unwrap().cost, 400000.0);
    }

    #[tokio::test]
    async fn test_in_flight_delete_failure_reopens_confirmation() {
        let (api, mut view) = loaded_view().await;
        let em = api.assignment_named("Em");

        view.request_delete(em.id);
        let delete = view.begin_delete().unwrap();
        assert!(!view.request_delete(em.id));
        assert!(matches!(view.delete_state(), DeleteState::Deleting(_)));

        api.fail_next_delete(Failure::Server);
        let err = view.finish_delete(delete.send().await).await.unwrap_err();

        assert!(matches!(view.delete_state(), DeleteState::Confirming(t) if t.error.as_ref() == Some(&err)));
        assert_eq!(view.rows().len(), 2);
    }
}
