use chrono::FixedOffset;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::{
    api::StaffingApi,
    cache::{CachedQuery, QueryCache, QueryKey},
    models::{
        Assignment, CreateAssignmentInput, OrderStaffCosts, StaffRole, SuggestStaffQuery, SuggestionResponse,
        UpdateAssignmentInput,
    },
    telemetry::{CACHE_HITS_TOTAL, MUTATIONS_TOTAL, REQUEST_DURATION_SECONDS},
    AppConfig, AppResult,
};

/// Cached reads and invalidating writes over a [`StaffingApi`].
///
/// Shared by both views through an `Arc`. Invalidation happens here, after the
/// backend confirms a write, so it still runs if the view that started the
/// request has since been dropped.
pub struct StaffingService {
    api: Arc<dyn StaffingApi>,
    cache: QueryCache,
    suggestion_limit: u32,
    utc_offset: FixedOffset,
}

impl StaffingService {
    pub fn new(api: Arc<dyn StaffingApi>, config: &AppConfig) -> Self {
        Self::from_parts(
            api,
            QueryCache::new(config.cache_ttl),
            config.suggestion_limit,
            config.utc_offset,
        )
    }

    pub fn from_parts(
        api: Arc<dyn StaffingApi>,
        cache: QueryCache,
        suggestion_limit: u32,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            api,
            cache,
            suggestion_limit,
            utc_offset,
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn assignments(&self, order_id: Uuid) -> AppResult<Arc<Vec<Assignment>>> {
        let key = QueryKey::Assignments(order_id);
        if let Some(CachedQuery::Assignments(rows)) = self.cache.get(&key).await {
            record_cache_hit(&key);
            return Ok(rows);
        }

        let costs = self.fetch_staff_costs(order_id).await?;
        Ok(Arc::new(costs.assignments.clone()))
    }

    pub async fn staff_costs(&self, order_id: Uuid) -> AppResult<Arc<OrderStaffCosts>> {
        let key = QueryKey::StaffCosts(order_id);
        if let Some(CachedQuery::StaffCosts(costs)) = self.cache.get(&key).await {
            record_cache_hit(&key);
            return Ok(costs);
        }

        self.fetch_staff_costs(order_id).await
    }

    /// The list and the summary come from the same endpoint, so one fetch
    /// fills both keys.
    async fn fetch_staff_costs(&self, order_id: Uuid) -> AppResult<Arc<OrderStaffCosts>> {
        let costs = Arc::new(self.api.order_staff_costs(order_id).await?);

        self.cache
            .insert(
                QueryKey::Assignments(order_id),
                CachedQuery::Assignments(Arc::new(costs.assignments.clone())),
            )
            .await;
        self.cache
            .insert(QueryKey::StaffCosts(order_id), CachedQuery::StaffCosts(costs.clone()))
            .await;

        Ok(costs)
    }

    /// Filtering happens on the server; each role filter is its own query.
    pub async fn suggestions(
        &self,
        order_id: Uuid,
        role_filter: Option<StaffRole>,
    ) -> AppResult<Arc<SuggestionResponse>> {
        let key = QueryKey::Suggestions(order_id, role_filter);
        if let Some(CachedQuery::Suggestions(response)) = self.cache.get(&key).await {
            record_cache_hit(&key);
            return Ok(response);
        }

        let query = SuggestStaffQuery {
            limit: self.suggestion_limit,
            role_filter,
        };
        let response = Arc::new(self.api.suggest_staff(order_id, &query).await?);
        self.cache
            .insert(key, CachedQuery::Suggestions(response.clone()))
            .await;

        Ok(response)
    }

    pub async fn create_assignment(&self, input: &CreateAssignmentInput) -> AppResult<Assignment> {
        let started = Instant::now();
        let result = self.api.create_assignment(input).await;
        record_mutation("create", started, result.is_ok());

        let assignment = result?;
        tracing::info!(
            order_id = %input.event_id,
            employee_id = %input.employee_id,
            assignment_id = %assignment.id,
            role = %input.role,
            "Assignment created"
        );
        self.cache.invalidate_order(input.event_id).await;

        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        order_id: Uuid,
        assignment_id: Uuid,
        input: &UpdateAssignmentInput,
    ) -> AppResult<Assignment> {
        let started = Instant::now();
        let result = self.api.update_assignment(assignment_id, input).await;
        record_mutation("update", started, result.is_ok());

        let assignment = result?;
        tracing::info!(%order_id, %assignment_id, "Assignment window updated");
        self.cache.invalidate_order(order_id).await;

        Ok(assignment)
    }

    pub async fn delete_assignment(&self, order_id: Uuid, assignment_id: Uuid) -> AppResult<()> {
        let started = Instant::now();
        let result = self.api.delete_assignment(assignment_id).await;
        record_mutation("delete", started, result.is_ok());

        result?;
        tracing::info!(%order_id, %assignment_id, "Assignment deleted");
        self.cache.invalidate_order(order_id).await;

        Ok(())
    }
}

fn record_mutation(op: &'static str, started: Instant, ok: bool) {
    let outcome = if ok { "success" } else { "error" };

    counter!(MUTATIONS_TOTAL, "op" => op, "outcome" => outcome).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "op" => op).record(started.elapsed().as_secs_f64());
}

fn record_cache_hit(key: &QueryKey) {
    tracing::debug!(?key, "Query cache hit");
    counter!(CACHE_HITS_TOTAL, "query" => key.label()).increment(1);
}
