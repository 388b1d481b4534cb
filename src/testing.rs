//! In-memory backend for unit tests.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    api::StaffingApi,
    cache::QueryCache,
    models::{
        Assignment, AssignmentStatus, CreateAssignmentInput, OrderStaffCosts, StaffRole, SuggestStaffQuery,
        SuggestionCandidate, SuggestionResponse, UpdateAssignmentInput,
    },
    schedule, AppError, AppResult, StaffingService,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SuggestStaff {
        order_id: Uuid,
        role_filter: Option<StaffRole>,
    },
    StaffCosts(Uuid),
    Create(CreateAssignmentInput),
    Update(Uuid, UpdateAssignmentInput),
    Delete(Uuid),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Conflict,
    Server,
}

impl Failure {
    fn into_error(self) -> AppError {
        match self {
            Failure::Conflict => AppError::Conflict(
                "Employee has conflicting assignment in the requested time window".to_string(),
            ),
            Failure::Server => AppError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                detail: "database unavailable".to_string(),
            },
        }
    }
}

struct FakeState {
    calls: Vec<Call>,
    suggestions: SuggestionResponse,
    costs: OrderStaffCosts,
    create_failures: HashMap<Uuid, Failure>,
    update_failure: Option<Failure>,
    delete_failure: Option<Failure>,
    suggestion_failure: Option<Failure>,
}

pub(crate) struct FakeStaffingApi {
    state: Mutex<FakeState>,
    creates_in_flight: AtomicUsize,
    max_creates_in_flight: AtomicUsize,
}

impl FakeStaffingApi {
    pub fn new(suggestions: SuggestionResponse, costs: OrderStaffCosts) -> Self {
        Self {
            state: Mutex::new(FakeState {
                calls: Vec::new(),
                suggestions,
                costs,
                create_failures: HashMap::new(),
                update_failure: None,
                delete_failure: None,
                suggestion_failure: None,
            }),
            creates_in_flight: AtomicUsize::new(0),
            max_creates_in_flight: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Create(_) | Call::Update(..) | Call::Delete(_)))
            .count()
    }

    pub fn creates(&self) -> Vec<CreateAssignmentInput> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Create(input) => Some(input.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn candidate_named(&self, name: &str) -> SuggestionCandidate {
        self.state()
            .suggestions
            .suggestions
            .iter()
            .find(|c| c.employee_name == name)
            .cloned()
            .unwrap()
    }

    pub fn available_candidate(&self) -> SuggestionCandidate {
        self.state()
            .suggestions
            .suggestions
            .iter()
            .find(|c| c.is_available)
            .cloned()
            .unwrap()
    }

    pub fn assignment_named(&self, name: &str) -> Assignment {
        self.state()
            .costs
            .assignments
            .iter()
            .find(|a| a.employee_name == name)
            .cloned()
            .unwrap()
    }

    pub fn assignment_count(&self) -> usize {
        self.state().costs.assignments.len()
    }

    pub fn fail_create_for(&self, employee_id: Uuid, failure: Failure) {
        self.state().create_failures.insert(employee_id, failure);
    }

    pub fn fail_next_update(&self, failure: Failure) {
        self.state().update_failure = Some(failure);
    }

    pub fn fail_next_delete(&self, failure: Failure) {
        self.state().delete_failure = Some(failure);
    }

    pub fn fail_next_suggestions(&self, failure: Failure) {
        self.state().suggestion_failure = Some(failure);
    }

    pub fn max_concurrent_creates(&self) -> usize {
        self.max_creates_in_flight.load(Ordering::SeqCst)
    }
}

fn recompute_totals(costs: &mut OrderStaffCosts) {
    costs.total_planned_hours = costs.assignments.iter().map(Assignment::planned_hours).sum();
    costs.total_actual_hours = costs.assignments.iter().map(|a| a.actual_hours).sum();
    costs.total_staff_cost = costs.assignments.iter().map(|a| a.cost).sum();
    costs.staff_count = costs.assignments.len() as u32;
}

#[async_trait]
impl StaffingApi for FakeStaffingApi {
    async fn suggest_staff(&self, order_id: Uuid, query: &SuggestStaffQuery) -> AppResult<SuggestionResponse> {
        let mut state = self.state();
        state.calls.push(Call::SuggestStaff {
            order_id,
            role_filter: query.role_filter,
        });
        if let Some(failure) = state.suggestion_failure.take() {
            return Err(failure.into_error());
        }

        let mut response = state.suggestions.clone();
        if let Some(role) = query.role_filter {
            response.suggestions.retain(|c| c.role_type == role);
        }
        response.total_available = response.suggestions.iter().filter(|c| c.is_available).count() as u32;
        Ok(response)
    }

    async fn order_staff_costs(&self, order_id: Uuid) -> AppResult<OrderStaffCosts> {
        let mut state = self.state();
        state.calls.push(Call::StaffCosts(order_id));
        Ok(state.costs.clone())
    }

    async fn create_assignment(&self, input: &CreateAssignmentInput) -> AppResult<Assignment> {
        let now_in_flight = self.creates_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_creates_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        // give any concurrently issued create a chance to overlap
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;

        let result = {
            let mut state = self.state();
            state.calls.push(Call::Create(input.clone()));

            match state.create_failures.get(&input.employee_id).copied() {
                Some(failure) => Err(failure.into_error()),
                None => {
                    let candidate = state
                        .suggestions
                        .suggestions
                        .iter_mut()
                        .find(|c| c.employee_id == input.employee_id);
                    let (name, rate) = match candidate {
                        Some(c) => {
                            c.is_available = false;
                            c.conflict_reason = Some("Already assigned to this order".to_string());
                            (c.employee_name.clone(), c.hourly_rate)
                        }
                        None => (String::new(), 0.0),
                    };

                    let hours = schedule::hours_between_timestamps(input.start_time, input.end_time);
                    let assignment = Assignment {
                        id: Uuid::new_v4(),
                        employee_id: input.employee_id,
                        event_id: input.event_id,
                        employee_name: name,
                        role: input.role,
                        phone: None,
                        start_time: Some(input.start_time),
                        end_time: Some(input.end_time),
                        actual_hours: 0.0,
                        hourly_rate: rate,
                        cost: hours * rate,
                        status: AssignmentStatus::Pending,
                    };
                    state.costs.assignments.push(assignment.clone());
                    recompute_totals(&mut state.costs);
                    Ok(assignment)
                }
            }
        };

        self.creates_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn update_assignment(&self, assignment_id: Uuid, input: &UpdateAssignmentInput) -> AppResult<Assignment> {
        let mut state = self.state();
        state.calls.push(Call::Update(assignment_id, input.clone()));
        if let Some(failure) = state.update_failure.take() {
            return Err(failure.into_error());
        }

        let assignment = state
            .costs
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;
        assignment.start_time = Some(input.start_time);
        assignment.end_time = Some(input.end_time);
        assignment.cost = assignment.estimated_cost();
        let updated = assignment.clone();

        recompute_totals(&mut state.costs);
        Ok(updated)
    }

    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()> {
        let mut state = self.state();
        state.calls.push(Call::Delete(assignment_id));
        if let Some(failure) = state.delete_failure.take() {
            return Err(failure.into_error());
        }

        let before = state.costs.assignments.len();
        state.costs.assignments.retain(|a| a.id != assignment_id);
        if state.costs.assignments.len() == before {
            return Err(AppError::NotFound("Assignment not found".to_string()));
        }

        recompute_totals(&mut state.costs);
        Ok(())
    }
}

pub(crate) mod fixtures {
    use super::*;

    pub fn ict() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    pub fn event_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn candidate(name: &str, role: StaffRole, rate: f64, available: bool) -> SuggestionCandidate {
        SuggestionCandidate {
            employee_id: Uuid::new_v4(),
            employee_name: name.to_string(),
            role_type: role,
            phone: Some("0901234567".to_string()),
            is_fulltime: available,
            hourly_rate: rate,
            current_workload: if available { 1 } else { 4 },
            is_available: available,
            score: if available { 0.9 } else { 0.2 },
            conflict_reason: (!available).then(|| "Assigned to ORD-0990 from 09:00 to 17:00".to_string()),
        }
    }

    fn assignment(order_id: Uuid, name: &str, role: StaffRole, rate: f64, window: Option<(&str, &str)>) -> Assignment {
        let (start_time, end_time) = match window {
            Some((start, end)) => (
                schedule::compose_date_time("2024-06-15", start, &ict()),
                schedule::compose_date_time("2024-06-15", end, &ict()),
            ),
            None => (None, None),
        };
        let mut assignment = Assignment {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            event_id: order_id,
            employee_name: name.to_string(),
            role,
            phone: None,
            start_time,
            end_time,
            actual_hours: 0.0,
            hourly_rate: rate,
            cost: 0.0,
            status: AssignmentStatus::Confirmed,
        };
        assignment.cost = assignment.estimated_cost();
        assignment
    }

    /// Order with an event at 10:00 on 2024-06-15, four candidates (Chi is
    /// double-booked) and two existing assignments (Giang is unscheduled).
    pub fn backend(order_id: Uuid) -> FakeStaffingApi {
        let suggestions = SuggestionResponse {
            order_id,
            order_code: "ORD-1001".to_string(),
            event_date: Some(event_date()),
            event_time: Some("10:00:00".to_string()),
            required_roles: vec![StaffRole::Chef, StaffRole::Waiter, StaffRole::Driver],
            suggestions: vec![
                candidate("An", StaffRole::Chef, 60000.0, true),
                candidate("Binh", StaffRole::Waiter, 40000.0, true),
                candidate("Chi", StaffRole::Waiter, 40000.0, false),
                candidate("Dung", StaffRole::Driver, 45000.0, true),
            ],
            total_available: 3,
        };

        let mut costs = OrderStaffCosts {
            order_id,
            order_code: "ORD-1001".to_string(),
            total_staff_cost: 0.0,
            total_planned_hours: 0.0,
            total_actual_hours: 0.0,
            staff_count: 0,
            assignments: vec![
                assignment(order_id, "Em", StaffRole::Waiter, 50000.0, Some(("08:00", "12:00"))),
                assignment(order_id, "Giang", StaffRole::Kitchen, 35000.0, None),
            ],
        };
        recompute_totals(&mut costs);

        FakeStaffingApi::new(suggestions, costs)
    }

    pub fn service() -> (Arc<FakeStaffingApi>, Arc<StaffingService>, Uuid) {
        let order_id = Uuid::new_v4();
        let api = Arc::new(backend(order_id));
        let service = Arc::new(StaffingService::from_parts(
            api.clone(),
            QueryCache::new(Duration::from_secs(60)),
            20,
            ict(),
        ));
        (api, service, order_id)
    }

    pub fn create_input(order_id: Uuid, candidate: &SuggestionCandidate) -> CreateAssignmentInput {
        CreateAssignmentInput {
            event_id: order_id,
            employee_id: candidate.employee_id,
            role: candidate.role_type,
            start_time: schedule::compose_date_time("2024-06-15", "10:00", &ict()).unwrap(),
            end_time: schedule::compose_date_time("2024-06-15", "18:00", &ict()).unwrap(),
            notes: None,
        }
    }
}
