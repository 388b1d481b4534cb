//! Ranked staffing candidates for an order, with one-at-a-time inline
//! assignment and sequential bulk assignment.

use std::sync::Arc;
use uuid::Uuid;

use super::{Completed, Notification, PendingRequest};
use crate::{
    models::{Assignment, CreateAssignmentInput, StaffRole, SuggestionCandidate, SuggestionResponse},
    schedule::{self, WindowDraft},
    StaffingService,
};

/// The single inline time picker.
#[derive(Debug, Clone, PartialEq)]
pub struct InlinePicker {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub role: StaffRole,
    pub hourly_rate: f64,
    pub draft: WindowDraft,
    pub submitting: bool,
    pub error: Option<Notification>,
}

impl InlinePicker {
    pub fn hours(&self) -> f64 {
        self.draft.hours()
    }

    pub fn estimated_cost(&self) -> f64 {
        self.draft.estimated_cost(self.hourly_rate)
    }
}

/// One tagged value instead of per-row flags, so two pickers can never be
/// open at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PickerState {
    #[default]
    Closed,
    Open(InlinePicker),
}

/// Snapshot of a checked candidate. Kept even when a later role filter hides
/// the candidate from the visible list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCandidate {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub role: StaffRole,
    pub hourly_rate: f64,
}

impl From<&SuggestionCandidate> for SelectedCandidate {
    fn from(candidate: &SuggestionCandidate) -> Self {
        Self {
            employee_id: candidate.employee_id,
            employee_name: candidate.employee_name.clone(),
            role: candidate.role_type,
            hourly_rate: candidate.hourly_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkPreview {
    pub count: usize,
    pub hours_each: f64,
    pub estimated_total_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub result: Result<Assignment, Notification>,
}

/// Per-candidate results of a bulk assignment, in selection order. Each
/// success is committed on its own; failures do not roll anything back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkAssignReport {
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkAssignReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BulkOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BulkOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

pub struct SuggestionView {
    order_id: Uuid,
    service: Arc<StaffingService>,
    role_filter: Option<StaffRole>,
    data: Option<Arc<SuggestionResponse>>,
    /// Seeded once per successful fetch; shared by the picker and bulk draft.
    defaults: WindowDraft,
    picker: PickerState,
    selection: Vec<SelectedCandidate>,
    bulk: WindowDraft,
    bulk_submitting: bool,
}

impl SuggestionView {
    pub fn new(service: Arc<StaffingService>, order_id: Uuid) -> Self {
        let defaults = WindowDraft::standard_shift(schedule::today_in(&service.utc_offset()));

        Self {
            order_id,
            service,
            role_filter: None,
            data: None,
            bulk: defaults.clone(),
            defaults,
            picker: PickerState::Closed,
            selection: Vec::new(),
            bulk_submitting: false,
        }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    /// Fetch candidates for the current role filter.
    pub async fn load(&mut self) -> Result<(), Notification> {
        let response = self
            .service
            .suggestions(self.order_id, self.role_filter)
            .await
            .map_err(|e| Notification::from_error("load staff suggestions", &e))?;

        let today = schedule::today_in(&self.service.utc_offset());
        self.defaults = WindowDraft::for_event(response.event_date, response.event_time.as_deref(), today);
        if self.selection.is_empty() {
            self.bulk = self.defaults.clone();
        }

        tracing::debug!(
            order_id = %self.order_id,
            role_filter = ?self.role_filter,
            candidates = response.suggestions.len(),
            available = response.total_available,
            "Loaded staff suggestions"
        );
        self.data = Some(response);
        Ok(())
    }

    async fn refresh_after_mutation(&mut self) {
        if let Err(notification) = self.load().await {
            tracing::warn!(order_id = %self.order_id, error = %notification, "Failed to refresh suggestions after assignment");
        }
    }

    /// Re-query the server with a new filter. The selection and any open
    /// picker are left alone.
    pub async fn set_role_filter(&mut self, role_filter: Option<StaffRole>) -> Result<(), Notification> {
        self.role_filter = role_filter;
        self.load().await
    }

    pub fn role_filter(&self) -> Option<StaffRole> {
        self.role_filter
    }

    pub fn response(&self) -> Option<&SuggestionResponse> {
        self.data.as_deref()
    }

    pub fn candidates(&self) -> &[SuggestionCandidate] {
        self.data
            .as_deref()
            .map(|data| data.suggestions.as_slice())
            .unwrap_or_default()
    }

    fn candidate(&self, employee_id: Uuid) -> Option<&SuggestionCandidate> {
        self.data.as_deref().and_then(|data| data.candidate(employee_id))
    }

    pub fn defaults(&self) -> &WindowDraft {
        &self.defaults
    }

    pub fn selection(&self) -> &[SelectedCandidate] {
        &self.selection
    }

    pub fn is_selected(&self, employee_id: Uuid) -> bool {
        self.selection.iter().any(|s| s.employee_id == employee_id)
    }

    /// Check or uncheck a candidate for bulk assignment.
    ///
    /// Candidates the backend marked unavailable cannot be checked. Checking
    /// the first candidate re-seeds the bulk window from the defaults.
    /// Returns whether the selection changed. The selection is frozen while
    /// a bulk assignment is in flight.
    pub fn toggle_candidate_selection(&mut self, employee_id: Uuid) -> bool {
        if self.bulk_submitting {
            return false;
        }
        if let Some(index) = self.selection.iter().position(|s| s.employee_id == employee_id) {
            self.selection.remove(index);
            return true;
        }

        let Some(candidate) = self.candidate(employee_id) else {
            return false;
        };
        if !candidate.is_available {
            return false;
        }
        let selected = SelectedCandidate::from(candidate);

        if self.selection.is_empty() {
            self.bulk = self.defaults.clone();
        }
        self.selection.push(selected);
        true
    }

    pub fn clear_selection(&mut self) {
        if !self.bulk_submitting {
            self.selection.clear();
        }
    }

    pub fn bulk_draft(&self) -> &WindowDraft {
        &self.bulk
    }

    pub fn set_bulk_date(&mut self, date: &str) {
        if !self.bulk_submitting {
            self.bulk.date = date.to_string();
        }
    }

    pub fn set_bulk_start(&mut self, start: &str) {
        if !self.bulk_submitting {
            self.bulk.start = start.to_string();
        }
    }

    pub fn set_bulk_end(&mut self, end: &str) {
        if !self.bulk_submitting {
            self.bulk.end = end.to_string();
        }
    }

    pub fn bulk_preview(&self) -> BulkPreview {
        let hours_each = self.bulk.hours();
        BulkPreview {
            count: self.selection.len(),
            hours_each,
            estimated_total_cost: self
                .selection
                .iter()
                .map(|s| schedule::estimated_cost(hours_each, s.hourly_rate))
                .sum(),
        }
    }

    pub fn can_submit_bulk(&self) -> bool {
        !self.bulk_submitting && !self.selection.is_empty() && self.bulk.is_submittable(&self.service.utc_offset())
    }

    pub fn is_bulk_submitting(&self) -> bool {
        self.bulk_submitting
    }

    pub fn picker(&self) -> &PickerState {
        &self.picker
    }

    pub fn open_picker_employee(&self) -> Option<Uuid> {
        match &self.picker {
            PickerState::Open(picker) => Some(picker.employee_id),
            PickerState::Closed => None,
        }
    }

    /// Open the inline picker for one candidate, replacing any other open
    /// picker, seeded from the shared defaults. Unavailable candidates and
    /// pickers with a request in flight are left as they are.
    pub fn open_inline_picker(&mut self, employee_id: Uuid) -> bool {
        if matches!(&self.picker, PickerState::Open(picker) if picker.submitting) {
            return false;
        }
        let Some(candidate) = self.candidate(employee_id) else {
            return false;
        };
        if !candidate.is_available {
            return false;
        }

        let picker = InlinePicker {
            employee_id,
            employee_name: candidate.employee_name.clone(),
            role: candidate.role_type,
            hourly_rate: candidate.hourly_rate,
            draft: self.defaults.clone(),
            submitting: false,
            error: None,
        };

        if let Some(previous) = self.open_picker_employee() {
            tracing::debug!(%previous, next = %employee_id, "Replacing open inline picker");
        }
        self.picker = PickerState::Open(picker);
        true
    }

    pub fn close_inline_picker(&mut self) {
        if !matches!(&self.picker, PickerState::Open(picker) if picker.submitting) {
            self.picker = PickerState::Closed;
        }
    }

    fn picker_mut(&mut self) -> Option<&mut InlinePicker> {
        match &mut self.picker {
            PickerState::Open(picker) if !picker.submitting => Some(picker),
            _ => None,
        }
    }

    pub fn set_picker_date(&mut self, date: &str) {
        if let Some(picker) = self.picker_mut() {
            picker.draft.date = date.to_string();
        }
    }

    pub fn set_picker_start(&mut self, start: &str) {
        if let Some(picker) = self.picker_mut() {
            picker.draft.start = start.to_string();
        }
    }

    pub fn set_picker_end(&mut self, end: &str) {
        if let Some(picker) = self.picker_mut() {
            picker.draft.end = end.to_string();
        }
    }

    pub fn can_submit_picker(&self) -> bool {
        match &self.picker {
            PickerState::Open(picker) => !picker.submitting && picker.draft.is_submittable(&self.service.utc_offset()),
            PickerState::Closed => false,
        }
    }

    fn create_input(&self, employee_id: Uuid, role: StaffRole, draft: &WindowDraft) -> Result<CreateAssignmentInput, Notification> {
        let window = draft
            .resolve(&self.service.utc_offset())
            .map_err(|e| Notification::from_error("assign staff", &e))?;

        Ok(CreateAssignmentInput {
            event_id: self.order_id,
            employee_id,
            role,
            start_time: window.start_at,
            end_time: window.end_at,
            notes: None,
        })
    }

    /// Assign the picker's candidate in one go. See
    /// [`Self::begin_individual_assign`] for the split form.
    pub async fn confirm_individual_assign(&mut self) -> Result<Assignment, Notification> {
        let pending = self.begin_individual_assign()?;
        let completed = pending.send().await;
        self.finish_individual_assign(completed).await
    }

    /// Validate the picker's own date and times and mark it submitting.
    /// Invalid windows leave the picker open with the error attached.
    pub fn begin_individual_assign(&mut self) -> Result<PendingRequest<Assignment>, Notification> {
        let (employee_id, role, draft) = match &self.picker {
            PickerState::Open(picker) if !picker.submitting => (picker.employee_id, picker.role, picker.draft.clone()),
            _ => return Err(Notification::validation("No candidate is being assigned")),
        };

        let input = match self.create_input(employee_id, role, &draft) {
            Ok(input) => input,
            Err(notification) => {
                if let PickerState::Open(picker) = &mut self.picker {
                    picker.error = Some(notification.clone());
                }
                return Err(notification);
            }
        };

        if let PickerState::Open(picker) = &mut self.picker {
            picker.submitting = true;
            picker.error = None;
        }

        let service = self.service.clone();
        Ok(PendingRequest::new(employee_id, async move {
            service.create_assignment(&input).await
        }))
    }

    /// On success the picker closes, the employee leaves the bulk selection
    /// and suggestions are re-fetched. On any failure the picker stays open
    /// with the error attached so the operator can retry.
    pub async fn finish_individual_assign(&mut self, completed: Completed<Assignment>) -> Result<Assignment, Notification> {
        let employee_id = completed.target();
        let submitting =
            matches!(&self.picker, PickerState::Open(picker) if picker.submitting && picker.employee_id == employee_id);

        match completed.into_result() {
            Ok(assignment) => {
                if submitting {
                    self.picker = PickerState::Closed;
                }
                if !self.bulk_submitting {
                    self.selection.retain(|s| s.employee_id != employee_id);
                }
                self.refresh_after_mutation().await;
                Ok(assignment)
            }
            Err(e) => {
                let notification = Notification::from_error("assign staff", &e);
                if let PickerState::Open(picker) = &mut self.picker {
                    if submitting {
                        picker.submitting = false;
                        picker.error = Some(notification.clone());
                    }
                }
                Err(notification)
            }
        }
    }

    /// Assign every checked candidate in one go. See
    /// [`Self::begin_bulk_assign`] for the split form.
    pub async fn confirm_bulk_assign(&mut self) -> Result<BulkAssignReport, Notification> {
        let pending = self.begin_bulk_assign()?;
        let completed = pending.send().await;
        self.finish_bulk_assign(completed).await
    }

    /// Validate the shared window and hand out one request that assigns
    /// every checked candidate, one at a time in selection order. The
    /// selection is frozen until the result comes back.
    pub fn begin_bulk_assign(&mut self) -> Result<PendingRequest<BulkAssignReport>, Notification> {
        if self.bulk_submitting {
            return Err(Notification::validation("Bulk assignment already in progress"));
        }
        if self.selection.is_empty() {
            return Err(Notification::validation("Select at least one candidate"));
        }

        // Validate once; every candidate shares the window.
        let draft = self.bulk.clone();
        let jobs = self
            .selection
            .iter()
            .map(|s| -> Result<_, Notification> {
                Ok((s.clone(), self.create_input(s.employee_id, s.role, &draft)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.bulk_submitting = true;

        let service = self.service.clone();
        let order_id = self.order_id;
        Ok(PendingRequest::new(order_id, async move {
            let mut report = BulkAssignReport::default();

            for (candidate, input) in jobs {
                let result = service
                    .create_assignment(&input)
                    .await
                    .map_err(|e| Notification::from_error("assign staff", &e));

                if let Err(notification) = &result {
                    tracing::warn!(
                        %order_id,
                        employee_id = %candidate.employee_id,
                        error = %notification,
                        "Bulk assignment failed for candidate"
                    );
                }

                report.outcomes.push(BulkOutcome {
                    employee_id: candidate.employee_id,
                    employee_name: candidate.employee_name,
                    result,
                });
            }

            Ok(report)
        }))
    }

    /// The selection is cleared whatever the individual outcomes; the report
    /// carries each one for the caller.
    pub async fn finish_bulk_assign(
        &mut self,
        completed: Completed<BulkAssignReport>,
    ) -> Result<BulkAssignReport, Notification> {
        self.bulk_submitting = false;
        self.selection.clear();

        let report = completed
            .into_result()
            .map_err(|e| Notification::from_error("assign staff", &e))?;

        tracing::info!(
            order_id = %self.order_id,
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            "Bulk assignment finished"
        );

        if report.succeeded().next().is_some() {
            self.refresh_after_mutation().await;
        }

        Ok(report)
    }

    /// Leave the view. Always allowed; requests already sent still complete
    /// and invalidate the shared cache.
    pub fn close(self) {
        tracing::debug!(order_id = %self.order_id, "Suggestion view closed");
    }
}
