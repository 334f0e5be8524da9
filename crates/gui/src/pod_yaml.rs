//! Read-only YAML viewers for a pod and its events.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use metrics::counter;
use pipeview_api::{error_to_message, PipelineApi};
use pipeview_core::pod::{pod_events_yaml, pod_info_yaml};
use tracing::{debug, info};

use crate::fetch::FetchSlot;
use crate::model::BannerMode;
use crate::ui::banner::{banner_ui, details_window};
use crate::editor::yaml_editor;

pub const FAILED_POD_INFO: &str = "Failed to retrieve pod info.";
pub const FAILED_POD_EVENTS: &str = "Failed to retrieve pod events.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PodYamlKind {
    Info,
    Events,
}

impl PodYamlKind {
    pub fn failure_message(&self) -> &'static str {
        match self {
            PodYamlKind::Info => FAILED_POD_INFO,
            PodYamlKind::Events => FAILED_POD_EVENTS,
        }
    }

    fn metric_label(&self) -> &'static str {
        match self {
            PodYamlKind::Info => "pod_info",
            PodYamlKind::Events => "pod_events",
        }
    }
}

/// What the viewer shows right now. Exactly one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum YamlView {
    /// Load in flight or nothing to show.
    Nothing,
    Banner { message: &'static str, additional_info: String },
    Editor(String),
}

/// Fetch and render a pod (or its events) as YAML; errors come back as display text.
pub async fn fetch_pod_yaml(
    api: Arc<dyn PipelineApi>,
    kind: PodYamlKind,
    name: String,
    namespace: String,
) -> Result<String, String> {
    let t0 = Instant::now();
    let res = match kind {
        PodYamlKind::Info => api
            .get_pod_info(&name, &namespace)
            .await
            .map_err(|e| error_to_message(&e))
            .and_then(|v| pod_info_yaml(&v).map_err(|e| e.to_string())),
        PodYamlKind::Events => api
            .get_pod_events(&name, &namespace)
            .await
            .map_err(|e| error_to_message(&e))
            .and_then(|v| pod_events_yaml(&v).map_err(|e| e.to_string())),
    };
    info!(kind = kind.metric_label(), pod = %name, ns = %namespace, ok = res.is_ok(), took_ms = %t0.elapsed().as_millis(), "pod yaml: load done");
    res
}

type LoadKey = (String, String, PodYamlKind, u64);

/// Loads when pod name, namespace, kind or the refresh count change; stops
/// applying results once unmounted.
pub struct PodYaml {
    api: Arc<dyn PipelineApi>,
    kind: PodYamlKind,
    name: String,
    namespace: String,
    refreshes: u64,
    loaded_key: Option<LoadKey>,
    yaml: Option<String>,
    error: Option<String>,
    details_open: bool,
    slot: FetchSlot<Result<String, String>>,
}

impl PodYaml {
    pub fn new(api: Arc<dyn PipelineApi>, kind: PodYamlKind, name: &str, namespace: &str) -> Self {
        Self {
            api,
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
            refreshes: 0,
            loaded_key: None,
            yaml: None,
            error: None,
            details_open: false,
            slot: FetchSlot::new(kind.metric_label()),
        }
    }

    pub fn pod_info(api: Arc<dyn PipelineApi>, name: &str, namespace: &str) -> Self {
        Self::new(api, PodYamlKind::Info, name, namespace)
    }

    pub fn pod_events(api: Arc<dyn PipelineApi>, name: &str, namespace: &str) -> Self {
        Self::new(api, PodYamlKind::Events, name, namespace)
    }

    pub fn kind(&self) -> PodYamlKind {
        self.kind
    }

    pub fn set_target(&mut self, name: &str, namespace: &str) {
        if self.name != name {
            self.name = name.to_string();
        }
        if self.namespace != namespace {
            self.namespace = namespace.to_string();
        }
    }

    /// Retry: forces one new load on the next sync.
    pub fn refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn key(&self) -> LoadKey {
        (self.name.clone(), self.namespace.clone(), self.kind, self.refreshes)
    }

    /// Start a load if any dependency changed since the last one.
    pub fn sync(&mut self) -> bool {
        if !self.slot.is_active() {
            return false;
        }
        let key = self.key();
        if self.loaded_key.as_ref() == Some(&key) {
            return false;
        }
        self.loaded_key = Some(key);
        self.yaml = None;
        self.error = None;
        self.details_open = false;
        counter!("ui_yaml_loads_total", 1, "kind" => self.kind.metric_label());
        debug!(kind = self.kind.metric_label(), pod = %self.name, ns = %self.namespace, refreshes = self.refreshes, "pod yaml: load start");
        self.slot.start(fetch_pod_yaml(self.api.clone(), self.kind, self.name.clone(), self.namespace.clone()));
        true
    }

    /// Apply a finished load of the current generation. Returns true on change.
    pub fn poll(&mut self) -> bool {
        match self.slot.poll() {
            Some(Ok(text)) => {
                self.yaml = Some(text);
                true
            }
            Some(Err(detail)) => {
                self.error = Some(detail);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> YamlView {
        if let Some(detail) = &self.error {
            return YamlView::Banner { message: self.kind.failure_message(), additional_info: detail.clone() };
        }
        match &self.yaml {
            Some(text) if !text.is_empty() => YamlView::Editor(text.clone()),
            _ => YamlView::Nothing,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slot.in_flight()
    }

    pub fn unmount(&mut self) {
        self.slot.deactivate();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.sync();
        if self.poll() {
            ui.ctx().request_repaint();
        }
        if self.is_loading() {
            ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
        }
        match self.view() {
            YamlView::Nothing => {}
            YamlView::Banner { message, additional_info } => {
                let resp = banner_ui(ui, message, BannerMode::Warning, !additional_info.is_empty(), true);
                if resp.details_clicked {
                    self.details_open = true;
                }
                if resp.refresh_clicked {
                    self.refresh();
                }
                if self.details_open {
                    let id = egui::Id::new(("pod_yaml_details", self.kind.metric_label()));
                    self.details_open = details_window(ui.ctx(), id, message, &additional_info);
                }
            }
            YamlView::Editor(text) => {
                yaml_editor(ui, ("pod_yaml", self.kind.metric_label()), &text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeview_api::{ApiError, MockApi, MockCall};
    use serde_json::json;
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn pod() -> serde_json::Value {
        json!({"apiVersion": "v1", "kind": "Pod", "spec": {"x": 1}, "metadata": {"name": "p"}, "status": {"phase": "Running"}})
    }

    #[tokio::test]
    async fn success_shows_editor_with_spec_last_and_never_a_banner() {
        let mock = Arc::new(MockApi::new());
        mock.set_pod_info(Ok(pod()));
        let mut viewer = PodYaml::pod_info(mock.clone(), "p", "ns");
        assert!(viewer.sync());
        assert_eq!(viewer.view(), YamlView::Nothing);
        settle().await;
        assert!(viewer.poll());
        match viewer.view() {
            YamlView::Editor(text) => {
                assert!(text.starts_with("apiVersion: v1\n"));
                assert!(text.trim_end().ends_with("x: 1"));
            }
            other => panic!("expected editor, got {:?}", other),
        }
        assert_eq!(mock.calls(), vec![MockCall::PodInfo { name: "p".into(), namespace: "ns".into() }]);
    }

    #[tokio::test]
    async fn failure_shows_fixed_message_with_detail() {
        let mock = Arc::new(MockApi::new());
        mock.set_pod_events(Err(ApiError::Kube("events forbidden".into())));
        let mut viewer = PodYaml::pod_events(mock.clone(), "p", "ns");
        viewer.sync();
        settle().await;
        viewer.poll();
        assert_eq!(
            viewer.view(),
            YamlView::Banner { message: FAILED_POD_EVENTS, additional_info: "events forbidden".into() }
        );
    }

    #[tokio::test]
    async fn refresh_triggers_exactly_one_new_fetch() {
        let mock = Arc::new(MockApi::new());
        mock.set_pod_info(Err(ApiError::Transport("refused".into())));
        let mut viewer = PodYaml::pod_info(mock.clone(), "p", "ns");
        viewer.sync();
        settle().await;
        viewer.poll();
        assert!(matches!(viewer.view(), YamlView::Banner { .. }));

        mock.set_pod_info(Ok(pod()));
        viewer.refresh();
        assert_eq!(viewer.refreshes(), 1);
        assert!(viewer.sync());
        assert!(!viewer.sync());
        // banner cleared while the retry is in flight
        assert_eq!(viewer.view(), YamlView::Nothing);
        settle().await;
        viewer.poll();
        assert!(matches!(viewer.view(), YamlView::Editor(_)));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn unchanged_dependencies_do_not_refetch() {
        let mock = Arc::new(MockApi::new());
        mock.set_pod_info(Ok(pod()));
        let mut viewer = PodYaml::pod_info(mock.clone(), "p", "ns");
        viewer.sync();
        viewer.set_target("p", "ns");
        assert!(!viewer.sync());
        viewer.set_target("q", "ns");
        assert!(viewer.sync());
        settle().await;
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn result_after_unmount_is_ignored() {
        let mock = Arc::new(MockApi::gated());
        mock.set_pod_info(Ok(pod()));
        let mut viewer = PodYaml::pod_info(mock.clone(), "p", "ns");
        viewer.sync();
        viewer.unmount();
        mock.open_gate();
        settle().await;
        assert!(!viewer.poll());
        assert_eq!(viewer.view(), YamlView::Nothing);
        assert!(!viewer.sync());
    }

    #[tokio::test]
    async fn superseded_load_never_lands() {
        let mock = Arc::new(MockApi::gated());
        mock.set_pod_info(Ok(pod()));
        let mut viewer = PodYaml::pod_info(mock.clone(), "old", "ns");
        viewer.sync();
        let first = viewer.slot.generation();
        viewer.set_target("new", "ns");
        viewer.sync();
        assert_eq!(viewer.slot.generation(), first + 1);
        mock.open_gate();
        settle().await;
        assert!(viewer.poll());
        assert!(!viewer.poll());
        assert!(matches!(viewer.view(), YamlView::Editor(_)));
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn empty_text_shows_nothing() {
        let mut viewer = PodYaml::pod_info(Arc::new(MockApi::new()), "p", "ns");
        viewer.yaml = Some(String::new());
        assert_eq!(viewer.view(), YamlView::Nothing);
    }
}
