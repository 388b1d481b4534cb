use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::AppResult;

type BoxedRequest<T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'static>>;

/// A backend write that has been started by a view but not yet sent.
///
/// The view has already moved into its in-flight state when it hands this
/// out, so the shell can keep rendering (and driving other controls) while
/// [`PendingRequest::send`] runs. The [`Completed`] value goes back to the
/// view that started it.
#[must_use = "a pending request does nothing until it is sent and handed back to its view"]
pub struct PendingRequest<T> {
    target: Uuid,
    request: BoxedRequest<T>,
}

impl<T> PendingRequest<T> {
    pub(crate) fn new<F>(target: Uuid, request: F) -> Self
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        Self {
            target,
            request: Box::pin(request),
        }
    }

    /// The entity the write operates on: an assignment, an employee or,
    /// for bulk assignment, the order.
    pub fn target(&self) -> Uuid {
        self.target
    }

    pub async fn send(self) -> Completed<T> {
        Completed {
            target: self.target,
            result: self.request.await,
        }
    }
}

/// Backend answer for a [`PendingRequest`].
#[must_use = "hand the result back to the view that started the request"]
pub struct Completed<T> {
    target: Uuid,
    result: AppResult<T>,
}

impl<T> Completed<T> {
    pub fn target(&self) -> Uuid {
        self.target
    }

    pub(crate) fn into_result(self) -> AppResult<T> {
        self.result
    }
}

impl<T> std::fmt::Debug for PendingRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest").field("target", &self.target).finish_non_exhaustive()
    }
}
