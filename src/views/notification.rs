use std::fmt;

use crate::AppError;

pub const CONFLICT_MESSAGE: &str = "Employee already has an overlapping assignment";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    /// Blocked locally; no request was sent.
    Validation,
    /// Backend reported a double-booking.
    Conflict,
    Error,
}

/// A toast/inline message for the shell to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Validation,
            message: message.into(),
        }
    }

    /// `action` completes "Could not ...", e.g. "assign staff".
    pub fn from_error(action: &str, err: &AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::validation(msg.clone()),
            AppError::Conflict(_) => Self {
                kind: NotificationKind::Conflict,
                message: CONFLICT_MESSAGE.to_string(),
            },
            AppError::Unauthorized(_) => Self {
                kind: NotificationKind::Error,
                message: SESSION_EXPIRED_MESSAGE.to_string(),
            },
            _ => Self {
                kind: NotificationKind::Error,
                message: format!("Could not {}. Please try again.", action),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self.kind, NotificationKind::Success)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Notification {}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_conflict_and_generic_messages_differ() {
        let conflict = Notification::from_error(
            "assign staff",
            &AppError::from_api_failure(StatusCode::BAD_REQUEST, "conflicting assignment".into()),
        );
        assert_eq!(conflict.kind, NotificationKind::Conflict);
        assert_eq!(conflict.message, CONFLICT_MESSAGE);

        let generic = Notification::from_error(
            "assign staff",
            &AppError::from_api_failure(StatusCode::BAD_REQUEST, "role not allowed".into()),
        );
        assert_eq!(generic.kind, NotificationKind::Error);
        assert_eq!(generic.message, "Could not assign staff. Please try again.");
    }

    #[test]
    fn test_validation_keeps_its_message() {
        let n = Notification::from_error("save", &AppError::Validation("End time must be after start time".into()));
        assert_eq!(n.kind, NotificationKind::Validation);
        assert_eq!(n.message, "End time must be after start time");
        assert!(n.is_error());
        assert!(!Notification::success("Saved").is_error());
    }
}
