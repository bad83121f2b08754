//! The background form-submission pipeline: capture, dispatch, branch on
//! the outcome, and guaranteed restoration of the submit trigger.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use shared::{domain::FormId, protocol::SubmissionOutcome};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    field_errors::FieldErrorPresenter,
    form::{FieldValue, FormDescriptor},
    notify::{NotificationRequest, Notifier},
    refresh::ComponentRefresher,
    transport::SubmissionTransport,
    ClientEvent,
};

/// Gives the success notification time to render before leaving the page.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const BUSY_LABEL: &str = "Processing...";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while submitting the form";
const DEFAULT_SUCCESS_MESSAGE: &str = "Request completed successfully";

/// Captured once per submit action and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub url: String,
    pub method: shared::domain::HttpMethod,
    pub fields: Vec<(String, FieldValue)>,
    pub csrf_token: Option<String>,
}

impl SubmissionRequest {
    pub fn has_files(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, value)| matches!(value, FieldValue::File(_)))
    }

    pub fn text_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(name, value)| match value {
                FieldValue::Text(text) => Some((name.clone(), text.clone())),
                FieldValue::File(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Success {
        message: String,
        redirect_url: Option<String>,
    },
    ValidationFailure {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    TransportFailure {
        cause: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionDisposition {
    /// Form was not opted into background submission; the host's default
    /// navigation applies and the controller did nothing.
    DefaultNavigation,
    /// A submission for this form is already in flight.
    RejectedInFlight,
    /// No form is registered under that id.
    MissingForm,
    Settled(SubmissionResult),
}

/// Host navigation seam used for post-success redirects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

pub struct MissingNavigator;

impl Navigator for MissingNavigator {
    fn navigate(&self, url: &str) {
        debug!(url, "navigation requested but no navigator is configured");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Validation,
    Configuration,
    Unknown,
}

pub fn classify_failure(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
        || lower.contains("disconnect")
        || lower.contains("malformed")
        || lower.contains("failed to submit")
        || lower.contains("failed to reach")
    {
        FailureKind::Transport
    } else if lower.contains("unavailable") || lower.contains("not configured") {
        FailureKind::Configuration
    } else if lower.contains("invalid") || lower.contains("missing") {
        FailureKind::Validation
    } else {
        FailureKind::Unknown
    }
}

pub struct SubmissionController {
    transport: Arc<dyn SubmissionTransport>,
    notifier: Arc<Notifier>,
    refresher: Arc<ComponentRefresher>,
    navigator: Arc<dyn Navigator>,
    events: broadcast::Sender<ClientEvent>,
    csrf_token: Option<String>,
    forms: Mutex<HashMap<FormId, Arc<Mutex<FormDescriptor>>>>,
}

impl SubmissionController {
    pub fn new(
        transport: Arc<dyn SubmissionTransport>,
        notifier: Arc<Notifier>,
        refresher: Arc<ComponentRefresher>,
        navigator: Arc<dyn Navigator>,
        csrf_token: Option<String>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            transport,
            notifier,
            refresher,
            navigator,
            events,
            csrf_token,
            forms: Mutex::new(HashMap::new()),
        }
    }

    pub async fn register_form(&self, form: FormDescriptor) -> Arc<Mutex<FormDescriptor>> {
        let id = form.id.clone();
        let handle = Arc::new(Mutex::new(form));
        self.forms
            .lock()
            .await
            .insert(id, Arc::clone(&handle));
        handle
    }

    pub async fn form(&self, form_id: &FormId) -> Option<Arc<Mutex<FormDescriptor>>> {
        self.forms.lock().await.get(form_id).cloned()
    }

    pub async fn handle_submit(&self, form_id: &FormId) -> SubmissionDisposition {
        let Some(form) = self.form(form_id).await else {
            warn!(form = %form_id, "submit requested for unregistered form");
            return SubmissionDisposition::MissingForm;
        };

        // Capture and flip to the busy state under one lock, so a re-entrant
        // submit observes InFlight and the disabled trigger atomically.
        let (request, original_label) = {
            let mut guard = form.lock().await;
            if !guard.is_background_eligible() {
                debug!(form = %form_id, "form not opted into background submission; deferring to host navigation");
                return SubmissionDisposition::DefaultNavigation;
            }
            if !guard.try_begin_submission() {
                info!(form = %form_id, "submission already in flight; ignoring re-entrant submit");
                return SubmissionDisposition::RejectedInFlight;
            }
            let original_label = guard.submit.label.clone();
            guard.submit.label = BUSY_LABEL.to_string();
            guard.submit.enabled = false;
            (self.capture_request(&guard), original_label)
        };

        let result = self.settle(form_id, &form, request).await;

        // Guaranteed cleanup: the trigger is restored exactly once per
        // submission, whatever branch ran above.
        {
            let mut guard = form.lock().await;
            guard.submit.label = original_label;
            guard.submit.enabled = true;
            guard.finish_submission();
        }

        let _ = self.events.send(ClientEvent::SubmissionSettled {
            form_id: form_id.clone(),
            result: result.clone(),
        });
        SubmissionDisposition::Settled(result)
    }

    fn capture_request(&self, form: &FormDescriptor) -> SubmissionRequest {
        let fields = form
            .controls
            .iter()
            .filter_map(|control| {
                control
                    .value
                    .clone()
                    .map(|value| (control.name.clone(), value))
            })
            .collect();
        SubmissionRequest {
            url: form.action.clone(),
            method: form.method,
            fields,
            csrf_token: self.csrf_token.clone(),
        }
    }

    fn interpret(dispatch: Result<SubmissionOutcome>) -> SubmissionResult {
        match dispatch {
            Ok(outcome) if outcome.success => SubmissionResult::Success {
                message: outcome
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                redirect_url: outcome.redirect,
            },
            Ok(outcome) => SubmissionResult::ValidationFailure {
                message: outcome
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
                field_errors: outcome.errors.unwrap_or_default(),
            },
            Err(err) => SubmissionResult::TransportFailure {
                cause: format!("{err:#}"),
            },
        }
    }

    async fn settle(
        &self,
        form_id: &FormId,
        form: &Arc<Mutex<FormDescriptor>>,
        request: SubmissionRequest,
    ) -> SubmissionResult {
        let result = Self::interpret(self.transport.dispatch(request).await);

        match &result {
            SubmissionResult::Success {
                message,
                redirect_url,
            } => {
                self.notifier
                    .notify(NotificationRequest::success(message.clone()))
                    .await;
                match redirect_url {
                    Some(url) => self.schedule_redirect(form_id.clone(), url.clone()),
                    None => {
                        let mut guard = form.lock().await;
                        if !guard.is_persistent() {
                            guard.clear_values();
                        }
                    }
                }
                self.refresher.refresh_all().await;
            }
            SubmissionResult::ValidationFailure {
                message,
                field_errors,
            } => {
                self.notifier
                    .notify(NotificationRequest::error(message.clone()))
                    .await;
                let mut guard = form.lock().await;
                FieldErrorPresenter::present(&mut guard, field_errors);
            }
            SubmissionResult::TransportFailure { cause } => {
                self.notifier
                    .notify(NotificationRequest::error(TRANSPORT_FAILURE_MESSAGE))
                    .await;
                error!(
                    form = %form_id,
                    kind = ?classify_failure(cause),
                    cause = %cause,
                    "form submission transport failure"
                );
            }
        }

        result
    }

    fn schedule_redirect(&self, form_id: FormId, url: String) {
        let _ = self.events.send(ClientEvent::RedirectScheduled {
            form_id,
            url: url.clone(),
            delay: REDIRECT_DELAY,
        });
        let navigator = Arc::clone(&self.navigator);
        tokio::spawn(async move {
            tokio::time::sleep(REDIRECT_DELAY).await;
            navigator.navigate(&url);
        });
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
