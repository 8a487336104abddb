// Project Gate - Notification Records
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// schedule_notification builds and echoes a record. Nothing is armed,
// stored or delivered.

use crate::error::ToolError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wire names accepted for repeatInterval
pub const REPEAT_INTERVALS: &[&str] = &["none", "daily", "weekly", "monthly"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Scheduled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub trigger_time: String,
    #[serde(default)]
    pub repeat_interval: RepeatInterval,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub trigger_time: String,
    pub repeat_interval: RepeatInterval,
    pub data: Map<String, Value>,
    pub created_at: String,
    pub status: NotificationStatus,
}

/// Timestamp-derived ids, strictly increasing for the life of the process
#[derive(Debug, Default)]
pub struct NotificationIds {
    last: AtomicI64,
}

impl NotificationIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// `notif_<millis>`; bumped past the previous id when calls share a millisecond
    pub fn next(&self, now_millis: i64) -> String {
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now_millis.max(last + 1)))
            .unwrap_or_else(|p| p);
        format!("notif_{}", now_millis.max(prev + 1))
    }
}

/// ISO 8601 in UTC with millisecond precision: 2024-01-20T10:00:00.000Z
pub fn iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a caller-supplied trigger time.
///
/// Accepted, in order:
///   1. RFC 3339 (offset or Z)
///   2. RFC 2822
///   3. Date and time with a colon-less offset (+0200)
///   4. Date and time without offset, as local time
///   5. Bare date, as UTC midnight
pub fn parse_trigger_time(input: &str) -> Result<DateTime<Utc>, ToolError> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(ToolError::Parse(format!("Invalid date format: {:?}", input)))
}

/// Build the record for a request. Returns the record and a human message.
pub fn schedule(
    request: NotificationRequest,
    ids: &NotificationIds,
    now: DateTime<Utc>,
) -> Result<(Notification, String), ToolError> {
    let trigger = parse_trigger_time(&request.trigger_time)?;

    let message = format!(
        "Notification \"{}\" scheduled for {}",
        request.title,
        trigger.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );

    let notification = Notification {
        id: ids.next(now.timestamp_millis()),
        title: request.title,
        body: request.body,
        trigger_time: iso_millis(&trigger),
        repeat_interval: request.repeat_interval,
        data: request.data,
        created_at: iso_millis(&now),
        status: NotificationStatus::Scheduled,
    };

    log::info!("notification {} scheduled (not armed)", notification.id);
    Ok((notification, message))
}

// ============================================================================
// TESTS
// ============================================================================
