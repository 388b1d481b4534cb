use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Assignment, OrderStaffCosts, StaffRole, SuggestionResponse};

/// Query keys shared by the staffing views.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Assignments(Uuid),
    StaffCosts(Uuid),
    Suggestions(Uuid, Option<StaffRole>),
}

impl QueryKey {
    pub fn label(&self) -> &'static str {
        match self {
            QueryKey::Assignments(_) => "assignments",
            QueryKey::StaffCosts(_) => "staff_costs",
            QueryKey::Suggestions(..) => "suggestions",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CachedQuery {
    Assignments(Arc<Vec<Assignment>>),
    StaffCosts(Arc<OrderStaffCosts>),
    Suggestions(Arc<SuggestionResponse>),
}

/// TTL-bounded cache of fetched query results.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, CachedQuery>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(1_000)
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, value: CachedQuery) {
        self.inner.insert(key, value).await;
    }

    /// Drop every query that reads an order's staffing: its assignment list,
    /// its cost summary and its suggestions under every role filter.
    pub async fn invalidate_order(&self, order_id: Uuid) {
        self.inner.invalidate(&QueryKey::Assignments(order_id)).await;
        self.inner.invalidate(&QueryKey::StaffCosts(order_id)).await;
        self.inner.invalidate(&QueryKey::Suggestions(order_id, None)).await;
        for role in StaffRole::ALL {
            self.inner
                .invalidate(&QueryKey::Suggestions(order_id, Some(role)))
                .await;
        }
        tracing::debug!(%order_id, "Invalidated staffing queries for order");
    }
}
