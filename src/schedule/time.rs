//! Pure time and cost derivation shared by both views.
//!
//! Nothing here returns an error for malformed input: unparsable dates and
//! times become `None` (or 0 hours) at the parsing boundary, and callers treat
//! that as "do not submit". [`WindowDraft::resolve`] is the one place that
//! turns those sentinels into a validation error for the submit path.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DEFAULT_START: &str = "08:00";
pub const DEFAULT_END: &str = "16:00";
pub const DEFAULT_SHIFT_HOURS: i64 = 8;

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Same-day wall-clock hours from `start` to `end`, clamped at 0.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> f64 {
    let minutes = (end - start).num_minutes();
    (minutes as f64 / 60.0).max(0.0)
}

/// [`hours_between`] over picker strings; unparsable input counts as 0 hours.
pub fn hours_between_str(start: &str, end: &str) -> f64 {
    match (parse_time(start), parse_time(end)) {
        (Some(start), Some(end)) => hours_between(start, end),
        _ => 0.0,
    }
}

pub fn hours_between_timestamps(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let minutes = (end - start).num_minutes();
    (minutes as f64 / 60.0).max(0.0)
}

pub fn estimated_cost(hours: f64, hourly_rate: f64) -> f64 {
    hours * hourly_rate
}

/// Combine a picker date and time, read in `tz`, into an absolute instant.
/// `None` when either part is missing or malformed.
pub fn compose_date_time(date: &str, time: &str, tz: &FixedOffset) -> Option<DateTime<Utc>> {
    let naive = parse_date(date)?.and_time(parse_time(time)?);
    tz.from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

pub fn today_in(tz: &FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Split an instant into the `(YYYY-MM-DD, HH:MM)` strings a picker shows.
pub fn split_local(instant: DateTime<Utc>, tz: &FixedOffset) -> (String, String) {
    let local = instant.with_timezone(tz);
    (
        local.format(DATE_FORMAT).to_string(),
        local.format(TIME_FORMAT).to_string(),
    )
}

/// An in-progress date/start/end selection as typed into a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDraft {
    pub date: String,
    pub start: String,
    pub end: String,
}

/// A draft that passed validation and is ready to send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub hours: f64,
}

impl WindowDraft {
    pub fn new(date: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// The 08:00-16:00 fallback on `date`.
    pub fn standard_shift(date: NaiveDate) -> Self {
        Self::new(date.format(DATE_FORMAT).to_string(), DEFAULT_START, DEFAULT_END)
    }

    /// Seed from the order's event: start at `event_time` and run eight hours,
    /// capped at 23:59 so the window never crosses midnight. Falls back to the
    /// standard shift when the event has no usable time.
    pub fn for_event(event_date: Option<NaiveDate>, event_time: Option<&str>, today: NaiveDate) -> Self {
        let date = event_date.unwrap_or(today);

        let Some(start) = event_time.and_then(parse_time) else {
            return Self::standard_shift(date);
        };

        let (end, wrapped) = start.overflowing_add_signed(Duration::hours(DEFAULT_SHIFT_HOURS));
        let end = if wrapped != 0 {
            NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(end)
        } else {
            end
        };

        Self::new(
            date.format(DATE_FORMAT).to_string(),
            start.format(TIME_FORMAT).to_string(),
            end.format(TIME_FORMAT).to_string(),
        )
    }

    pub fn hours(&self) -> f64 {
        hours_between_str(&self.start, &self.end)
    }

    pub fn estimated_cost(&self, hourly_rate: f64) -> f64 {
        estimated_cost(self.hours(), hourly_rate)
    }

    /// Whether a submit control bound to this draft should be enabled.
    pub fn is_submittable(&self, tz: &FixedOffset) -> bool {
        self.resolve(tz).is_ok()
    }

    pub fn resolve(&self, tz: &FixedOffset) -> AppResult<ResolvedWindow> {
        let hours = self.hours();
        if hours <= 0.0 {
            return Err(AppError::Validation(
                "End time must be after start time".to_string(),
            ));
        }

        let start_at = compose_date_time(&self.date, &self.start, tz)
            .ok_or_else(|| AppError::Validation("A valid date and start time are required".to_string()))?;
        let end_at = compose_date_time(&self.date, &self.end, tz)
            .ok_or_else(|| AppError::Validation("A valid date and end time are required".to_string()))?;

        Ok(ResolvedWindow {
            start_at,
            end_at,
            hours,
        })
    }
}
