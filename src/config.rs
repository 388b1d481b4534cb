use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::time::Duration;

use crate::{telemetry::LogFormat, AppError};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub suggestion_limit: u32,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// Zone the operator's date/time pickers are read in.
    pub utc_offset: FixedOffset,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_base_url = lookup("STAFFING_API_URL")
            .ok_or_else(|| AppError::Config("STAFFING_API_URL must be set".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let api_token = lookup("STAFFING_API_TOKEN").filter(|token| !token.is_empty());

        let suggestion_limit = parse_or_default(&lookup, "STAFFING_SUGGESTION_LIMIT", 20u32)?;
        let cache_ttl_secs = parse_or_default(&lookup, "STAFFING_CACHE_TTL_SECS", 60u64)?;
        let timeout_secs = parse_or_default(&lookup, "STAFFING_REQUEST_TIMEOUT_SECS", 15u64)?;

        let utc_offset = match lookup("STAFFING_UTC_OFFSET") {
            Some(raw) => parse_utc_offset(&raw)?,
            None => default_utc_offset(),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("text") | None => LogFormat::Text,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "invalid LOG_FORMAT: {} (expected json or text)",
                    other
                )))
            }
        };

        Ok(Self {
            api_base_url,
            api_token,
            suggestion_limit,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            utc_offset,
            log_format,
        })
    }
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Config(format!("invalid {}: {}", key, err))),
        None => Ok(default),
    }
}

/// Indochina Time, where the operators work.
pub fn default_utc_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or(Utc.fix())
}

/// Parses `+07:00`, `-05:30` or `Z`.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset, AppError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    raw.parse::<FixedOffset>()
        .map_err(|_| AppError::Config(format!("invalid STAFFING_UTC_OFFSET: {}", raw)))
}
