use std::sync::RwLock;

use super::{claims::SessionClaims, jwt::decode_unverified};

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Authenticated session owned by the app shell and injected into the API
/// client. The staffing core never touches token storage itself.
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<CurrentUser>;
    fn token(&self) -> Option<String>;
    fn logout(&self);
}

/// Session backed by a single bearer token.
#[derive(Debug, Default)]
pub struct TokenSession {
    token: RwLock<Option<String>>,
}

impl TokenSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    fn claims(&self) -> Option<SessionClaims> {
        let token = self.token()?;
        match decode_unverified(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token is not a readable JWT");
                None
            }
        }
    }

    /// Tokens without an `exp` claim never report as expired.
    pub fn is_expired(&self) -> bool {
        self.claims()
            .and_then(|claims| claims.exp)
            .map(|exp| exp <= chrono::Utc::now().timestamp())
            .unwrap_or(false)
    }
}

impl SessionProvider for TokenSession {
    fn current_user(&self) -> Option<CurrentUser> {
        self.claims().map(|claims| CurrentUser {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn logout(&self) {
        let mut token = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if token.take().is_some() {
            tracing::info!("Session cleared");
        }
    }
}
