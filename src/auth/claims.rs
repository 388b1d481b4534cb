use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    pub sub: String,         // Employee / user ID
    pub exp: Option<i64>,    // Expiration timestamp
    pub iat: Option<i64>,    // Issued at timestamp
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>, // Dashboard role, e.g. "admin", "manager"
}
