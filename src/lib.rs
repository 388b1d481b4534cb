pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod service;
pub mod telemetry;
pub mod views;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use uuid::Uuid;

pub use api::{HttpStaffingApi, StaffingApi};
pub use auth::{SessionProvider, TokenSession};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use service::StaffingService;
pub use views::{AssignmentListView, Notification, SuggestionView};

/// Everything an app shell needs to host the staffing views.
#[derive(Clone)]
pub struct StaffingApp {
    pub config: AppConfig,
    pub session: Arc<dyn SessionProvider>,
    pub service: Arc<StaffingService>,
}

impl StaffingApp {
    /// Build the HTTP-backed stack. Uses `STAFFING_API_TOKEN` for the session
    /// when set, otherwise starts signed out.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let session: Arc<dyn SessionProvider> = match &config.api_token {
            Some(token) => Arc::new(TokenSession::new(token.clone())),
            None => Arc::new(TokenSession::anonymous()),
        };

        Self::with_session(config, session)
    }

    /// Build against a session the shell already owns.
    pub fn with_session(config: AppConfig, session: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let api = Arc::new(HttpStaffingApi::new(&config, session.clone())?);
        let service = Arc::new(StaffingService::new(api, &config));

        tracing::info!(
            api_base_url = %config.api_base_url,
            signed_in = session.token().is_some(),
            "Staffing client ready"
        );

        Ok(Self {
            config,
            session,
            service,
        })
    }

    pub fn assignment_list(&self, order_id: Uuid) -> AssignmentListView {
        AssignmentListView::new(self.service.clone(), order_id)
    }

    pub fn suggestions(&self, order_id: Uuid) -> SuggestionView {
        SuggestionView::new(self.service.clone(), order_id)
    }
}
