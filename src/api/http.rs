use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use super::StaffingApi;
use crate::{
    auth::SessionProvider,
    error::extract_detail,
    models::{
        Assignment, CreateAssignmentInput, OrderStaffCosts, SuggestStaffQuery, SuggestionResponse,
        UpdateAssignmentInput,
    },
    AppConfig, AppError, AppResult,
};

/// reqwest-backed [`StaffingApi`].
pub struct HttpStaffingApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpStaffingApi {
    pub fn new(config: &AppConfig, session: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.api_base_url, session))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);

        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> AppResult<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, path, "Staffing backend unreachable");
            AppError::Http(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, path, "Staffing backend responded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        let err = AppError::from_api_failure(status, detail);

        match &err {
            AppError::Conflict(detail) => {
                tracing::warn!(status = %status, path, detail, "Backend reported a scheduling conflict");
            }
            AppError::Unauthorized(_) => {
                tracing::warn!(path, "Backend rejected the session; logging out");
                self.session.logout();
            }
            _ => {
                tracing::error!(status = %status, path, error = %err, "Staffing backend returned error");
            }
        }

        Err(err)
    }

    async fn json<T: DeserializeOwned>(response: Response, path: &str) -> AppResult<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!(error = %e, path, "Failed to parse staffing backend response");
            AppError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl StaffingApi for HttpStaffingApi {
    async fn suggest_staff(&self, order_id: Uuid, query: &SuggestStaffQuery) -> AppResult<SuggestionResponse> {
        let path = format!("/orders/{}/suggest-staff", order_id);
        tracing::debug!(%order_id, role_filter = ?query.role_filter, limit = query.limit, "Fetching staff suggestions");

        let builder = self.request(Method::GET, &path).query(query);
        let response = self.send(builder, &path).await?;
        Self::json(response, &path).await
    }

    async fn order_staff_costs(&self, order_id: Uuid) -> AppResult<OrderStaffCosts> {
        let path = format!("/orders/{}/staff-costs", order_id);
        tracing::debug!(%order_id, "Fetching order staff costs");

        let response = self.send(self.request(Method::GET, &path), &path).await?;
        Self::json(response, &path).await
    }

    async fn create_assignment(&self, input: &CreateAssignmentInput) -> AppResult<Assignment> {
        let path = "/hr/assignments";
        tracing::debug!(event_id = %input.event_id, employee_id = %input.employee_id, "Creating assignment");

        let builder = self.request(Method::POST, path).json(input);
        let response = self.send(builder, path).await?;
        Self::json(response, path).await
    }

    async fn update_assignment(&self, assignment_id: Uuid, input: &UpdateAssignmentInput) -> AppResult<Assignment> {
        let path = format!("/hr/assignments/{}", assignment_id);
        tracing::debug!(%assignment_id, "Updating assignment window");

        let builder = self.request(Method::PUT, &path).json(input);
        let response = self.send(builder, &path).await?;
        Self::json(response, &path).await
    }

    async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()> {
        let path = format!("/hr/assignments/{}", assignment_id);
        tracing::debug!(%assignment_id, "Deleting assignment");

        self.send(self.request(Method::DELETE, &path), &path).await?;
        Ok(())
    }
}
