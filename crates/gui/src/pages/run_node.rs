#![forbid(unsafe_code)]

use std::rc::Rc;
use std::sync::Arc;

use eframe::egui;
use pipeview_api::PipelineApi;
use pipeview_core::node_details::SelectedNodeInfo;

use crate::model::{ToolbarAction, ToolbarProps};
use crate::node_details::node_details_ui;
use crate::page::{construct, Page, PageBase, PageChrome};
use crate::pod_yaml::PodYaml;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunNodeTab {
    Pod,
    Events,
    Node,
}

/// One pipeline step: its pod, the pod's events and the static node details.
pub struct RunNodePage {
    base: PageBase,
    api: Arc<dyn PipelineApi>,
    pod_name: String,
    namespace: String,
    tab: RunNodeTab,
    viewer: Option<PodYaml>,
    node_info: Option<SelectedNodeInfo>,
}

impl RunNodePage {
    pub fn new(
        chrome: Rc<dyn PageChrome>,
        api: Arc<dyn PipelineApi>,
        pod_name: &str,
        namespace: &str,
        node_info: Option<SelectedNodeInfo>,
    ) -> Self {
        let viewer = Some(PodYaml::pod_info(api.clone(), pod_name, namespace));
        construct(Self {
            base: PageBase::new(chrome),
            api,
            pod_name: pod_name.to_string(),
            namespace: namespace.to_string(),
            tab: RunNodeTab::Pod,
            viewer,
            node_info,
        })
    }

    pub fn tab(&self) -> RunNodeTab {
        self.tab
    }

    /// Switching tabs unmounts the old viewer and mounts a fresh one.
    pub fn set_tab(&mut self, tab: RunNodeTab) {
        if tab == self.tab {
            return;
        }
        if let Some(v) = self.viewer.as_mut() {
            v.unmount();
        }
        self.viewer = match tab {
            RunNodeTab::Pod => Some(PodYaml::pod_info(self.api.clone(), &self.pod_name, &self.namespace)),
            RunNodeTab::Events => Some(PodYaml::pod_events(self.api.clone(), &self.pod_name, &self.namespace)),
            RunNodeTab::Node => None,
        };
        self.tab = tab;
    }

    pub fn set_target(&mut self, pod_name: &str, namespace: &str) {
        self.pod_name = pod_name.to_string();
        self.namespace = namespace.to_string();
        if let Some(v) = self.viewer.as_mut() {
            v.set_target(pod_name, namespace);
        }
    }

    pub fn set_node_info(&mut self, info: Option<SelectedNodeInfo>) {
        self.node_info = info;
    }
}

impl Page for RunNodePage {
    fn base(&self) -> &PageBase {
        &self.base
    }

    fn initial_toolbar_state(&self) -> ToolbarProps {
        ToolbarProps {
            page_title: "Run node".into(),
            breadcrumbs: Vec::new(),
            actions: vec![ToolbarAction {
                title: "Refresh".into(),
                tooltip: "Reload pod data".into(),
                disabled: false,
                action: self.base.refresh_callback(),
            }],
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        let mut tab = self.tab;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut tab, RunNodeTab::Pod, "Pod");
            ui.selectable_value(&mut tab, RunNodeTab::Events, "Events");
            ui.selectable_value(&mut tab, RunNodeTab::Node, "Node details");
        });
        self.set_tab(tab);
        ui.separator();
        match self.tab {
            RunNodeTab::Node => match &self.node_info {
                Some(info) => {
                    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| node_details_ui(ui, info));
                }
                None => {
                    ui.label(egui::RichText::new("Load a node info file to see step details.").italics().weak());
                }
            },
            _ if self.pod_name.is_empty() || self.namespace.is_empty() => {
                ui.label(egui::RichText::new("Enter a pod name and namespace.").italics().weak());
            }
            _ => {
                if let Some(v) = self.viewer.as_mut() {
                    v.ui(ui);
                }
            }
        }
    }

    fn refresh(&mut self) {
        self.base.clear_banner();
        if let Some(v) = self.viewer.as_mut() {
            v.refresh();
        }
    }

    fn unmount(&mut self) {
        if let Some(v) = self.viewer.as_mut() {
            v.unmount();
        }
    }
}
