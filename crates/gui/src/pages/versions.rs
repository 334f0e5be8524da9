#![forbid(unsafe_code)]

use std::rc::Rc;
use std::sync::Arc;

use eframe::egui;
use pipeview_api::PipelineApi;
use pipeview_core::routes;
use tracing::info;

use crate::model::{Breadcrumb, ToolbarAction, ToolbarProps};
use crate::page::{construct, Page, PageBase, PageChrome};
use crate::version_list::{ErrorCallback, PipelineVersionList, PipelineVersionListProps};

pub struct PipelineVersionsPage {
    base: PageBase,
    list: PipelineVersionList,
}

impl PipelineVersionsPage {
    pub fn new(chrome: Rc<dyn PageChrome>, api: Arc<dyn PipelineApi>, pipeline_id: Option<String>, page_size: u32) -> Self {
        let base = PageBase::new(chrome);
        let errors = base.error_handler();
        let on_error: ErrorCallback = Box::new(move |message: &str, detail: &str| errors.show(message, Some(&detail), None, None));
        let props = PipelineVersionListProps {
            pipeline_id,
            page_size: Some(page_size),
            on_selection_change: Some(Box::new(|ids: &[String]| info!(selected = ids.len(), "versions: selection changed"))),
            ..Default::default()
        };
        let list = PipelineVersionList::new(api, props, on_error);
        construct(Self { base, list })
    }

    pub fn list(&self) -> &PipelineVersionList {
        &self.list
    }

    /// Follow a version link: route change plus a confirmation snackbar.
    pub fn open_version(&self, path: String) {
        if !self.base.is_mounted() {
            return;
        }
        self.base.show_snackbar(format!("Opened {}", path));
        self.base.chrome().navigate(path);
    }

    pub fn set_pipeline_id(&mut self, pipeline_id: Option<String>) {
        if self.list.pipeline_id() == pipeline_id.as_deref() {
            return;
        }
        self.base.clear_banner();
        self.list.set_pipeline_id(pipeline_id);
        self.base.chrome().update_toolbar(self.initial_toolbar_state());
    }
}

impl Page for PipelineVersionsPage {
    fn base(&self) -> &PageBase {
        &self.base
    }

    fn initial_toolbar_state(&self) -> ToolbarProps {
        let page_title = match self.list.pipeline_id() {
            Some(pid) => format!("Versions of {}", pid),
            None => "Pipeline versions".to_string(),
        };
        ToolbarProps {
            page_title,
            breadcrumbs: vec![Breadcrumb { display_name: "Pipelines".into(), href: routes::PIPELINES.into() }],
            actions: vec![ToolbarAction {
                title: "Refresh".into(),
                tooltip: "Reload the version list".into(),
                disabled: false,
                action: self.base.refresh_callback(),
            }],
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        if self.list.pipeline_id().is_none() {
            ui.label(egui::RichText::new("Enter a pipeline id to list its versions.").italics().weak());
            ui.add_space(6.0);
        }
        if let Some(path) = self.list.ui(ui) {
            self.open_version(path);
        }
    }

    fn refresh(&mut self) {
        self.base.clear_banner();
        self.list.reload();
    }

    fn unmount(&mut self) {
        self.list.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{SharedChrome, CLICK_DETAILS};
    use crate::version_list::FAILED_TO_LIST;
    use pipeview_api::{ApiError, MockApi};
    use pipeview_core::ListRequest;

    fn page(mock: &Arc<MockApi>, pid: Option<&str>) -> (SharedChrome, PipelineVersionsPage) {
        let chrome = SharedChrome::new();
        let page = PipelineVersionsPage::new(Rc::new(chrome.clone()), mock.clone(), pid.map(str::to_string), 20);
        (chrome, page)
    }

    #[test]
    fn toolbar_names_the_pipeline() {
        let mock = Arc::new(MockApi::new());
        let (chrome, mut page) = page(&mock, Some("p1"));
        let tb = chrome.toolbar();
        assert_eq!(tb.page_title, "Versions of p1");
        assert_eq!(tb.breadcrumbs[0].href, routes::PIPELINES);
        assert_eq!(page.list().table_state().page_size(), 20);

        page.set_pipeline_id(None);
        assert_eq!(chrome.toolbar().page_title, "Pipeline versions");
    }

    #[test]
    fn version_link_navigates_with_snackbar() {
        let mock = Arc::new(MockApi::new());
        let (chrome, mut page) = page(&mock, Some("p1"));
        page.open_version("/pipelines/details/p1/version/v1".into());
        assert_eq!(chrome.take_navigation().as_deref(), Some("/pipelines/details/p1/version/v1"));
        let snack = chrome.take_snackbar().expect("snackbar");
        assert!(snack.open);
        assert_eq!(snack.message, "Opened /pipelines/details/p1/version/v1");

        Page::teardown(&mut page);
        page.open_version("/late".into());
        assert_eq!(chrome.take_navigation(), None);
        assert_eq!(chrome.take_snackbar(), None);
    }

    #[tokio::test]
    async fn list_failure_lands_in_page_banner() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Err(ApiError::Http { status: 500, body: "boom".into() }));
        let (chrome, mut page) = page(&mock, Some("p1"));
        let token = page.list.load_pipeline_versions(&ListRequest::default()).await;
        assert_eq!(token, "");
        let banner = chrome.banner();
        assert_eq!(banner.message, Some(format!("{}{}", FAILED_TO_LIST, CLICK_DETAILS)));
        assert_eq!(banner.additional_info.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn failure_after_teardown_is_silent() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Err(ApiError::Transport("refused".into())));
        let (chrome, mut page) = page(&mock, Some("p1"));
        Page::teardown(&mut page);
        page.list.load_pipeline_versions(&ListRequest::default()).await;
        assert!(chrome.banner().is_empty());
    }
}
