//! Pipeview API façade.
//!
//! This crate defines the collaborator contract frontends (GUI/CLI) depend on:
//! pod lookups against Kubernetes and pipeline version listing against the
//! pipeline service REST API.

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{info, warn};

pub use pipeview_core::{ListPipelineVersionsResponse, PipelineVersion, ResourceType};

/// Default pipeline service endpoint when `PIPEVIEW_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// Default table page size when `PIPEVIEW_PAGE_SIZE` is unset.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// API errors; transportable so remote frontends can surface them as-is.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(String),
    #[error("kube: {0}")]
    Kube(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Resolve any API error to the text shown to users.
///
/// HTTP errors prefer the service's `error`/`message` JSON fields, then the
/// raw body, then the status line.
pub fn error_to_message(err: &ApiError) -> String {
    match err {
        ApiError::Http { status, body } => {
            if let Ok(v) = serde_json::from_str::<Value>(body) {
                for key in ["error", "message"] {
                    if let Some(s) = v.get(key).and_then(|x| x.as_str()) {
                        if !s.is_empty() {
                            return s.to_string();
                        }
                    }
                }
            }
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status)
            } else {
                trimmed.to_string()
            }
        }
        ApiError::Transport(m) | ApiError::Kube(m) | ApiError::Decode(m) | ApiError::Internal(m) => m.clone(),
    }
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string(), page_size: DEFAULT_PAGE_SIZE }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("PIPEVIEW_API_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let page_size = std::env::var("PIPEVIEW_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { base_url, page_size }
    }
}

/// Read-only API surface used by the dashboard.
#[async_trait::async_trait]
pub trait PipelineApi: Send + Sync {
    /// Raw pod object.
    async fn get_pod_info(&self, name: &str, namespace: &str) -> ApiResult<Value>;

    /// Event list for a pod.
    async fn get_pod_events(&self, name: &str, namespace: &str) -> ApiResult<Value>;

    /// One page of versions belonging to a resource (normally a pipeline).
    async fn list_pipeline_versions(
        &self,
        resource_type: ResourceType,
        pipeline_id: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
        sort_by: Option<&str>,
    ) -> ApiResult<ListPipelineVersionsResponse>;
}

// ----------------- Live implementation -----------------

/// Talks to Kubernetes (pods) and the pipeline service (versions).
pub struct LiveApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl LiveApi {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn map_kube_err(e: anyhow::Error) -> ApiError {
        ApiError::Kube(format!("{:#}", e))
    }

    fn versions_url(&self) -> String {
        format!("{}/apis/v1beta1/pipeline_versions", self.config.base_url.trim_end_matches('/'))
    }
}

/// Query pairs for the list versions endpoint; unset paging/sort values are omitted.
pub fn list_versions_query(
    resource_type: ResourceType,
    pipeline_id: &str,
    page_size: Option<u32>,
    page_token: Option<&str>,
    sort_by: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut q = vec![
        ("resource_key.type", resource_type.as_str().to_string()),
        ("resource_key.id", pipeline_id.to_string()),
    ];
    if let Some(n) = page_size {
        q.push(("page_size", n.to_string()));
    }
    if let Some(t) = page_token.filter(|t| !t.is_empty()) {
        q.push(("page_token", t.to_string()));
    }
    if let Some(s) = sort_by.filter(|s| !s.is_empty()) {
        q.push(("sort_by", s.to_string()));
    }
    q
}

fn record(op: &'static str, t0: Instant, ok: bool) {
    let ms = t0.elapsed().as_secs_f64() * 1000.0;
    counter!("api_requests_total", 1, "op" => op, "ok" => if ok { "true" } else { "false" });
    histogram!("api_request_ms", ms, "op" => op);
}

#[async_trait::async_trait]
impl PipelineApi for LiveApi {
    async fn get_pod_info(&self, name: &str, namespace: &str) -> ApiResult<Value> {
        let t0 = Instant::now();
        info!(pod = %name, ns = %namespace, "api: get_pod_info start");
        let res = pipeview_kubehub::get_pod(name, namespace).await.map_err(Self::map_kube_err);
        record("get_pod_info", t0, res.is_ok());
        match &res {
            Ok(_) => info!(took_ms = %t0.elapsed().as_millis(), "api: get_pod_info ok"),
            Err(e) => warn!(error = %e, took_ms = %t0.elapsed().as_millis(), "api: get_pod_info failed"),
        }
        res
    }

    async fn get_pod_events(&self, name: &str, namespace: &str) -> ApiResult<Value> {
        let t0 = Instant::now();
        info!(pod = %name, ns = %namespace, "api: get_pod_events start");
        let res = pipeview_kubehub::list_pod_events(name, namespace).await.map_err(Self::map_kube_err);
        record("get_pod_events", t0, res.is_ok());
        match &res {
            Ok(_) => info!(took_ms = %t0.elapsed().as_millis(), "api: get_pod_events ok"),
            Err(e) => warn!(error = %e, took_ms = %t0.elapsed().as_millis(), "api: get_pod_events failed"),
        }
        res
    }

    async fn list_pipeline_versions(
        &self,
        resource_type: ResourceType,
        pipeline_id: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
        sort_by: Option<&str>,
    ) -> ApiResult<ListPipelineVersionsResponse> {
        let t0 = Instant::now();
        let url = self.versions_url();
        info!(pipeline = %pipeline_id, page_size = ?page_size, sort_by = ?sort_by, "api: list_pipeline_versions start");
        let query = list_versions_query(resource_type, pipeline_id, page_size, page_token, sort_by);
        let res = async {
            let resp = self
                .http
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| ApiError::Transport(format!("request to {} failed: {}", url, e)))?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiError::Http { status: status.as_u16(), body });
            }
            resp.json::<ListPipelineVersionsResponse>()
                .await
                .map_err(|e| ApiError::Decode(format!("pipeline versions response: {}", e)))
        }
        .await;
        record("list_pipeline_versions", t0, res.is_ok());
        match &res {
            Ok(r) => info!(
                versions = r.versions.as_ref().map(|v| v.len()).unwrap_or(0),
                more = r.next_page_token.as_deref().map(|t| !t.is_empty()).unwrap_or(false),
                took_ms = %t0.elapsed().as_millis(),
                "api: list_pipeline_versions ok"
            ),
            Err(e) => warn!(error = %e, took_ms = %t0.elapsed().as_millis(), "api: list_pipeline_versions failed"),
        }
        res
    }
}

// ----------------- Mock implementation -----------------

/// A call observed by [`MockApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    PodInfo { name: String, namespace: String },
    PodEvents { name: String, namespace: String },
    ListVersions {
        resource_type: ResourceType,
        pipeline_id: String,
        page_size: Option<u32>,
        page_token: Option<String>,
        sort_by: Option<String>,
    },
}

/// In-memory implementation for tests: canned responses, call log and an
/// optional gate that holds every call open until [`MockApi::open_gate`].
pub struct MockApi {
    pub pod_info: Mutex<ApiResult<Value>>,
    pub pod_events: Mutex<ApiResult<Value>>,
    pub versions: Mutex<ApiResult<ListPipelineVersionsResponse>>,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<MockCall>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            pod_info: Mutex::new(Err(ApiError::Internal("no pod info configured".into()))),
            pod_events: Mutex::new(Err(ApiError::Internal("no pod events configured".into()))),
            versions: Mutex::new(Err(ApiError::Internal("no versions configured".into()))),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls block until the gate is opened.
    pub fn gated() -> Self {
        Self { gate: Some(Arc::new(Semaphore::new(0))), ..Self::default() }
    }

    pub fn open_gate(&self) {
        if let Some(g) = &self.gate {
            g.add_permits(1);
        }
    }

    pub fn set_pod_info(&self, res: ApiResult<Value>) {
        if let Ok(mut slot) = self.pod_info.lock() {
            *slot = res;
        }
    }

    pub fn set_pod_events(&self, res: ApiResult<Value>) {
        if let Ok(mut slot) = self.pod_events.lock() {
            *slot = res;
        }
    }

    pub fn set_versions(&self, res: ApiResult<ListPipelineVersionsResponse>) {
        if let Ok(mut slot) = self.versions.lock() {
            *slot = res;
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn log(&self, call: MockCall) {
        if let Ok(mut c) = self.calls.lock() {
            c.push(call);
        }
    }

    async fn pass_gate(&self) {
        if let Some(g) = &self.gate {
            // Permit is returned on drop, so one open releases every waiter.
            let _ = g.acquire().await;
        }
    }

    fn read<T: Clone>(slot: &Mutex<ApiResult<T>>) -> ApiResult<T> {
        slot.lock().map_err(|_| ApiError::Internal("mock poisoned".into()))?.clone()
    }
}

#[async_trait::async_trait]
impl PipelineApi for MockApi {
    async fn get_pod_info(&self, name: &str, namespace: &str) -> ApiResult<Value> {
        self.log(MockCall::PodInfo { name: name.into(), namespace: namespace.into() });
        self.pass_gate().await;
        Self::read(&self.pod_info)
    }

    async fn get_pod_events(&self, name: &str, namespace: &str) -> ApiResult<Value> {
        self.log(MockCall::PodEvents { name: name.into(), namespace: namespace.into() });
        self.pass_gate().await;
        Self::read(&self.pod_events)
    }

    async fn list_pipeline_versions(
        &self,
        resource_type: ResourceType,
        pipeline_id: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
        sort_by: Option<&str>,
    ) -> ApiResult<ListPipelineVersionsResponse> {
        self.log(MockCall::ListVersions {
            resource_type,
            pipeline_id: pipeline_id.into(),
            page_size,
            page_token: page_token.map(|s| s.to_string()),
            sort_by: sort_by.map(|s| s.to_string()),
        });
        self.pass_gate().await;
        Self::read(&self.versions)
    }
}
