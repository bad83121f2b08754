use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{domain::Severity, error::ApiError};

/// Body the server answers every background form submission with.
///
/// `success: true` may carry a confirmation message and a redirect target;
/// `success: false` may carry a summary message plus per-field errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl SubmissionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            redirect: None,
            errors: None,
        }
    }

    pub fn rejected(message: impl Into<String>, errors: BTreeMap<String, String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            redirect: None,
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Aggregate payload of the dashboard snapshot endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    #[serde(default)]
    pub recent_customers: Vec<ActivityEntry>,
    #[serde(default)]
    pub recent_projects: Vec<ActivityEntry>,
    #[serde(default)]
    pub recent_payments: Vec<ActivityEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One-way events pushed by the server over the stream channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    Notification {
        message: String,
        severity: Severity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    DashboardUpdate {
        stats: BTreeMap<String, f64>,
    },
    Error(ApiError),
}
