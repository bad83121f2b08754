//! HTTP boundary: one outbound request per submission, plus the read-only
//! dashboard and search gateways.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Method};
use shared::{
    domain::HttpMethod,
    protocol::{DashboardSnapshot, SearchResponse, SubmissionOutcome},
};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::{form::FieldValue, submission::SubmissionRequest};

/// Header carrying the anti-forgery token supplied by the hosting page.
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub(crate) const DASHBOARD_SNAPSHOT_PATH: &str = "dashboard/api/dashboard-data/";
pub(crate) const SEARCH_PATH: &str = "api/v1/search/";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid form action '{action}': {source}")]
    InvalidAction {
        action: String,
        #[source]
        source: url::ParseError,
    },
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn dispatch(&self, request: SubmissionRequest) -> Result<SubmissionOutcome>;
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot>;
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, target: &str) -> Result<SearchResponse>;
}

pub struct MissingTransport;

#[async_trait]
impl SubmissionTransport for MissingTransport {
    async fn dispatch(&self, _request: SubmissionRequest) -> Result<SubmissionOutcome> {
        Err(anyhow!("submission transport is unavailable"))
    }
}

pub struct MissingSnapshotSource;

#[async_trait]
impl SnapshotSource for MissingSnapshotSource {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot> {
        Err(anyhow!("dashboard snapshot source is unavailable"))
    }
}

pub struct MissingSearchBackend;

#[async_trait]
impl SearchBackend for MissingSearchBackend {
    async fn search(&self, _query: &str, _target: &str) -> Result<SearchResponse> {
        Err(anyhow!("search backend is unavailable"))
    }
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url).map_err(|source| TransportError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, action: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(action)
            .map_err(|source| TransportError::InvalidAction {
                action: action.to_string(),
                source,
            })
    }
}

fn request_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn dispatch(&self, request: SubmissionRequest) -> Result<SubmissionOutcome> {
        let url = self.endpoint(&request.url)?;
        let mut builder = self.http.request(request_method(request.method), url.clone());
        if let Some(token) = &request.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }

        builder = if request.has_files() {
            let mut body = multipart::Form::new();
            for (name, value) in request.fields {
                match value {
                    FieldValue::Text(text) => body = body.text(name, text),
                    FieldValue::File(file) => {
                        let mut part =
                            multipart::Part::bytes(file.bytes).file_name(file.filename.clone());
                        if let Some(mime) = &file.mime_type {
                            part = part.mime_str(mime).with_context(|| {
                                format!("invalid mime type '{mime}' for file field '{name}'")
                            })?;
                        }
                        body = body.part(name, part);
                    }
                }
            }
            builder.multipart(body)
        } else if request.method == HttpMethod::Get {
            builder.query(&request.text_pairs())
        } else {
            builder.form(&request.text_pairs())
        };

        // The server reports validation failures in a well-formed body, often
        // with a non-2xx status; any parseable outcome is handed back to the
        // controller, so only connect and decode failures surface as errors.
        let response = builder
            .send()
            .await
            .with_context(|| format!("failed to submit form to {url}"))?;
        response
            .json::<SubmissionOutcome>()
            .await
            .with_context(|| format!("malformed submission response from {url}"))
    }
}

#[async_trait]
impl SnapshotSource for HttpTransport {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot> {
        let url = self.endpoint(DASHBOARD_SNAPSHOT_PATH)?;
        let snapshot = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to fetch dashboard snapshot from {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed dashboard snapshot from {url}"))?;
        Ok(snapshot)
    }
}

#[async_trait]
impl SearchBackend for HttpTransport {
    async fn search(&self, query: &str, target: &str) -> Result<SearchResponse> {
        let url = self.endpoint(SEARCH_PATH)?;
        let response = self
            .http
            .get(url.clone())
            .query(&[("q", query), ("target", target)])
            .send()
            .await
            .with_context(|| format!("search request to {url} failed"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed search response from {url}"))?;
        Ok(response)
    }
}

/// The three read/write gateways the client is wired with. One
/// `HttpTransport` normally backs all of them.
pub struct Gateways {
    pub submission: Arc<dyn SubmissionTransport>,
    pub snapshots: Arc<dyn SnapshotSource>,
    pub search: Arc<dyn SearchBackend>,
}

impl Gateways {
    pub fn http(base_url: &str) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(base_url)?);
        Ok(Self {
            submission: Arc::clone(&transport) as Arc<dyn SubmissionTransport>,
            snapshots: Arc::clone(&transport) as Arc<dyn SnapshotSource>,
            search: transport,
        })
    }

    pub fn missing() -> Self {
        Self {
            submission: Arc::new(MissingTransport),
            snapshots: Arc::new(MissingSnapshotSource),
            search: Arc::new(MissingSearchBackend),
        }
    }
}
