#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use eframe::egui;
use pipeview_api::{PipelineApi, DEFAULT_PAGE_SIZE};
use pipeview_core::node_details::SelectedNodeInfo;
use pipeview_core::routes;
use tracing::{info, warn};

mod editor;
pub mod fetch;
pub mod model;
pub mod node_details;
pub mod page;
pub mod pages;
pub mod pod_yaml;
pub mod table;
mod ui;
mod util;
pub mod version_list;

use model::{Route, Toast, ToastKind, TopbarInputs};
use page::{Page, PageChrome, SharedChrome};
use pages::{PipelineVersionsPage, RunNodePage};

/// Startup settings; `from_env` reads the `PIPEVIEW_*` variables.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub page_size: u32,
    pub node_info_path: Option<PathBuf>,
    pub pipeline_id: Option<String>,
    pub pod_name: Option<String>,
    pub namespace: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            page_size: page_size_setting(std::env::var("PIPEVIEW_PAGE_SIZE").ok().as_deref()),
            node_info_path: std::env::var("PIPEVIEW_NODE_INFO")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            ..Default::default()
        }
    }
}

/// Table page size from `PIPEVIEW_PAGE_SIZE`, snapped to a size the table offers.
fn page_size_setting(raw: Option<&str>) -> u32 {
    let Some(n) = raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0) else {
        return DEFAULT_PAGE_SIZE;
    };
    let size = table::nearest_page_size(n);
    if size != n {
        warn!(requested = n, using = size, "PIPEVIEW_PAGE_SIZE is not a table page size; snapped");
    }
    size
}

/// Entry point used by the desktop binary.
pub fn run_native(api: Arc<dyn PipelineApi>, config: AppConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();
    let app = PipeviewApp::new(api, config);
    eframe::run_native("Pipeview", options, Box::new(|_cc| Ok(Box::new(app))))
}

enum ActivePage {
    Versions(PipelineVersionsPage),
    RunNode(RunNodePage),
}

impl ActivePage {
    fn as_page(&mut self) -> &mut dyn Page {
        match self {
            ActivePage::Versions(p) => p,
            ActivePage::RunNode(p) => p,
        }
    }
}

pub struct PipeviewApp {
    api: Arc<dyn PipelineApi>,
    config: AppConfig,
    chrome: SharedChrome,
    route: Route,
    page: ActivePage,
    inputs: TopbarInputs,
    node_info: Option<SelectedNodeInfo>,
    node_info_source: Option<String>,
    // every path visited, oldest first
    history: Vec<String>,
    banner_details_open: bool,
    toasts: Vec<Toast>,
    log: String,
    last_error: Option<String>,
}

impl PipeviewApp {
    pub fn new(api: Arc<dyn PipelineApi>, config: AppConfig) -> Self {
        info!(page_size = config.page_size, node_info = ?config.node_info_path, "pipeview gui starting");
        let chrome = SharedChrome::new();
        let inputs = TopbarInputs {
            pipeline_id: config.pipeline_id.clone().unwrap_or_default(),
            pod_name: config.pod_name.clone().unwrap_or_default(),
            namespace: config.namespace.clone().unwrap_or_default(),
        };
        let route = if inputs.pod_name.is_empty() { Route::Versions } else { Route::RunNode };
        let mut this = Self {
            page: Self::mount(&api, &chrome, &config, &inputs, None, route),
            api,
            config,
            chrome,
            route,
            inputs,
            node_info: None,
            node_info_source: None,
            history: Vec::new(),
            banner_details_open: false,
            toasts: Vec::new(),
            log: String::new(),
            last_error: None,
        };
        if let Some(path) = this.config.node_info_path.clone() {
            this.open_node_info(&path);
        }
        let path = this.route_path();
        this.history.push(path);
        this
    }

    fn mount(
        api: &Arc<dyn PipelineApi>,
        chrome: &SharedChrome,
        config: &AppConfig,
        inputs: &TopbarInputs,
        node_info: Option<SelectedNodeInfo>,
        route: Route,
    ) -> ActivePage {
        let chrome: Rc<dyn PageChrome> = Rc::new(chrome.clone());
        match route {
            Route::Versions => {
                let pid = Some(inputs.pipeline_id.trim().to_string()).filter(|s| !s.is_empty());
                ActivePage::Versions(PipelineVersionsPage::new(chrome, api.clone(), pid, config.page_size))
            }
            Route::RunNode => ActivePage::RunNode(RunNodePage::new(
                chrome,
                api.clone(),
                inputs.pod_name.trim(),
                inputs.namespace.trim(),
                node_info,
            )),
        }
    }

    pub(crate) fn route(&self) -> Route {
        self.route
    }

    pub(crate) fn route_path(&self) -> String {
        match self.route {
            Route::Versions => routes::PIPELINES.to_string(),
            Route::RunNode => routes::run_node_path(self.inputs.namespace.trim(), self.inputs.pod_name.trim()),
        }
    }

    /// Tear the current page down and mount the one for `route`.
    pub(crate) fn navigate_to(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        self.page.as_page().teardown();
        self.page = Self::mount(&self.api, &self.chrome, &self.config, &self.inputs, self.node_info.clone(), route);
        self.route = route;
        self.banner_details_open = false;
        let path = self.route_path();
        info!(path = %path, "route changed");
        self.history.push(path);
    }

    /// Push top bar inputs into the mounted page.
    pub(crate) fn apply_inputs(&mut self) {
        let pid = Some(self.inputs.pipeline_id.trim().to_string()).filter(|s| !s.is_empty());
        let (pod, ns) = (self.inputs.pod_name.trim().to_string(), self.inputs.namespace.trim().to_string());
        match &mut self.page {
            ActivePage::Versions(p) => p.set_pipeline_id(pid),
            ActivePage::RunNode(p) => p.set_target(&pod, &ns),
        }
        self.log = match self.route {
            Route::Versions => format!("pipeline: {}", self.inputs.pipeline_id.trim()),
            Route::RunNode => format!("pod: {}/{}", ns, pod),
        };
    }

    pub(crate) fn open_node_info(&mut self, path: &Path) {
        match util::load_node_info(path) {
            Ok(info) => {
                info!(path = %path.display(), node_type = ?info.node_type, "node info loaded");
                self.node_info = Some(info.clone());
                self.node_info_source = Some(path.display().to_string());
                self.last_error = None;
                if let ActivePage::RunNode(p) = &mut self.page {
                    p.set_node_info(Some(info));
                }
                self.toast(format!("Loaded {}", path.display()), ToastKind::Success);
            }
            Err(e) => {
                warn!(error = %e, "node info load failed");
                self.last_error = Some(e.clone());
                self.toast(e, ToastKind::Error);
            }
        }
    }

    fn handle_navigation(&mut self) {
        if let Some(path) = self.chrome.take_navigation() {
            info!(path = %path, "navigate");
            self.log = format!("opened {}", path);
            self.history.push(path);
        }
    }

    fn pump_snackbar(&mut self) {
        if let Some(s) = self.chrome.take_snackbar() {
            if s.open && !s.message.is_empty() {
                self.toast(s.message, ToastKind::Info);
            }
        }
    }
}

impl eframe::App for PipeviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::topbar::ui_topbar(self, ctx);
        ui::statusbar::ui_statusbar(self, ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::topbar::ui_page_header(self, ui);
            self.page.as_page().show(ui);
        });
        let dialog = self.chrome.dialog();
        if ui::banner::dialog_ui(ctx, &dialog) {
            self.chrome.dismiss_dialog();
        }
        self.handle_navigation();
        self.pump_snackbar();
        ui::toasts::draw_toasts(self, ctx);
    }
}
