//! Paged list of a pipeline's versions.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use pipeview_api::{error_to_message, ApiResult, PipelineApi};
use pipeview_core::columns::{pipeline_version_columns, pipeline_version_rows, ColumnKind, ColumnSpec, Row};
use pipeview_core::format::inline_description;
use pipeview_core::routes::version_details_path;
use pipeview_core::{ListPipelineVersionsResponse, ListRequest, PipelineVersion, PipelineVersionSortKey, ResourceType};
use tracing::{info, warn};

use crate::fetch::FetchSlot;
use crate::table::{CellAction, CustomTable, SortOrder, TableEvent, TableFlags, TableState};

pub const FAILED_TO_LIST: &str = "Error: failed to retrieve list of pipeline versions.";
pub const NO_VERSIONS: &str = "No pipeline versions found.";

/// (message, resolved error text)
pub type ErrorCallback = Box<dyn Fn(&str, &str)>;
pub type SelectionCallback = Box<dyn Fn(&[String])>;

#[derive(Default)]
pub struct PipelineVersionListProps {
    pub pipeline_id: Option<String>,
    pub flags: TableFlags,
    pub selected_ids: Vec<String>,
    pub page_size: Option<u32>,
    pub on_selection_change: Option<SelectionCallback>,
}

pub async fn fetch_versions(
    api: Arc<dyn PipelineApi>,
    pipeline_id: String,
    request: ListRequest,
) -> ApiResult<ListPipelineVersionsResponse> {
    api.list_pipeline_versions(
        ResourceType::Pipeline,
        &pipeline_id,
        request.page_size,
        request.page_token.as_deref(),
        request.sort_by.as_deref(),
    )
    .await
}

pub struct PipelineVersionList {
    api: Arc<dyn PipelineApi>,
    pipeline_id: Option<String>,
    versions: Vec<PipelineVersion>,
    table: CustomTable,
    on_error: ErrorCallback,
    on_selection_change: Option<SelectionCallback>,
    slot: FetchSlot<ApiResult<ListPipelineVersionsResponse>>,
    needs_load: bool,
    reset_paging: bool,
}

impl PipelineVersionList {
    pub fn new(api: Arc<dyn PipelineApi>, props: PipelineVersionListProps, on_error: ErrorCallback) -> Self {
        let mut state = TableState::new(
            props.flags,
            Some(PipelineVersionSortKey::CreatedAt.as_str()),
            SortOrder::Desc,
            props.page_size.unwrap_or(crate::table::DEFAULT_PAGE_SIZE),
        );
        state.set_selected(props.selected_ids);
        Self {
            api,
            pipeline_id: props.pipeline_id,
            versions: Vec::new(),
            table: CustomTable::new("pipeline_versions", pipeline_version_columns(), state, NO_VERSIONS),
            on_error,
            on_selection_change: props.on_selection_change,
            slot: FetchSlot::new("pipeline_versions"),
            needs_load: true,
            reset_paging: false,
        }
    }

    pub fn pipeline_id(&self) -> Option<&str> {
        self.pipeline_id.as_deref()
    }

    pub fn versions(&self) -> &[PipelineVersion] {
        &self.versions
    }

    pub fn rows(&self) -> Vec<Row> {
        pipeline_version_rows(&self.versions)
    }

    pub fn table_state(&self) -> &TableState {
        &self.table.state
    }

    pub fn set_pipeline_id(&mut self, pipeline_id: Option<String>) {
        if self.pipeline_id != pipeline_id {
            self.pipeline_id = pipeline_id;
            self.needs_load = true;
            self.reset_paging = true;
        }
    }

    /// Reload the current page on the next frame.
    pub fn reload(&mut self) {
        self.needs_load = true;
    }

    /// Fetch one page and apply it. Returns the next page token ("" when
    /// there is none, nothing to fetch, or the fetch failed).
    pub async fn load_pipeline_versions(&mut self, request: &ListRequest) -> String {
        let Some(pipeline_id) = self.pipeline_id.clone() else {
            return String::new();
        };
        let res = fetch_versions(self.api.clone(), pipeline_id, request.clone()).await;
        self.apply_response(res)
    }

    /// Apply a finished fetch; returns the next page token.
    pub fn apply_response(&mut self, res: ApiResult<ListPipelineVersionsResponse>) -> String {
        match res {
            Ok(resp) => {
                self.versions = resp.versions.unwrap_or_default();
                resp.next_page_token.unwrap_or_default()
            }
            Err(e) => {
                let detail = error_to_message(&e);
                warn!(pipeline = ?self.pipeline_id, error = %detail, "versions: list failed");
                (self.on_error)(FAILED_TO_LIST, &detail);
                String::new()
            }
        }
    }

    fn start_load(&mut self, request: ListRequest) {
        match self.pipeline_id.clone() {
            Some(pipeline_id) => {
                info!(pipeline = %pipeline_id, page_token = ?request.page_token, sort_by = ?request.sort_by, "versions: load start");
                self.slot.start(fetch_versions(self.api.clone(), pipeline_id, request));
            }
            None => self.table.state.finish_reload(""),
        }
    }

    /// Apply a finished background load. Returns true on change.
    pub fn poll(&mut self) -> bool {
        let Some(res) = self.slot.poll() else { return false };
        let t0 = Instant::now();
        let failed = res.is_err();
        let token = self.apply_response(res);
        if failed {
            // rows on screen are still the last good page
            self.table.state.cancel_reload();
            return true;
        }
        self.table.state.finish_reload(&token);
        info!(count = self.versions.len(), has_next = !token.is_empty(), took_ms = %t0.elapsed().as_millis(), "versions: applied");
        true
    }

    pub fn unmount(&mut self) {
        self.slot.deactivate();
    }

    /// Draw the table; returns a path when a version link was clicked.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<String> {
        if self.needs_load && self.slot.is_active() {
            self.needs_load = false;
            let req = if std::mem::take(&mut self.reset_paging) {
                self.table.state.begin_first_page()
            } else {
                self.table.state.begin_reload()
            };
            self.start_load(req);
        }
        if self.poll() {
            ui.ctx().request_repaint();
        }
        if self.table.state.is_loading() {
            ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
        }
        let rows = self.rows();
        let pipeline_id = self.pipeline_id.clone();
        let mut render = |ui: &mut egui::Ui, spec: &ColumnSpec, row: &Row, value: &str| -> CellAction {
            version_cell(ui, spec, row, value, pipeline_id.as_deref())
        };
        let events = self.table.ui(ui, &rows, &mut render);
        let mut navigate = None;
        for ev in events {
            match ev {
                TableEvent::Reload(req) => self.start_load(req),
                TableEvent::SelectionChanged(ids) => {
                    if let Some(cb) = &self.on_selection_change {
                        cb(&ids);
                    }
                }
                TableEvent::Navigate(path) => navigate = Some(path),
            }
        }
        navigate
    }
}

/// Name cells link to the version details page; descriptions stay on one line.
fn version_cell(ui: &mut egui::Ui, spec: &ColumnSpec, row: &Row, value: &str, pipeline_id: Option<&str>) -> CellAction {
    match spec.kind {
        ColumnKind::VersionLink => {
            if ui.link(value).on_hover_text(value).clicked() {
                CellAction::Navigate(version_details_path(pipeline_id, &row.id))
            } else {
                CellAction::None
            }
        }
        ColumnKind::Description => {
            let resp = ui
                .add(egui::Label::new(inline_description(value)).truncate().sense(egui::Sense::click()))
                .on_hover_text(value);
            if resp.clicked() {
                CellAction::SelectRow
            } else {
                CellAction::None
            }
        }
        ColumnKind::Text => {
            ui.label(value);
            CellAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeview_api::{ApiError, MockApi, MockCall};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn version(id: &str) -> PipelineVersion {
        PipelineVersion { id: Some(id.into()), name: Some(format!("name-{}", id)), ..Default::default() }
    }

    fn list(
        mock: &Arc<MockApi>,
        pipeline_id: Option<&str>,
    ) -> (PipelineVersionList, Rc<RefCell<Vec<(String, String)>>>) {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = errors.clone();
        let props = PipelineVersionListProps { pipeline_id: pipeline_id.map(str::to_string), ..Default::default() };
        let on_error: ErrorCallback = Box::new(move |m: &str, e: &str| sink.borrow_mut().push((m.to_string(), e.to_string())));
        (PipelineVersionList::new(mock.clone(), props, on_error), errors)
    }

    fn request() -> ListRequest {
        ListRequest {
            page_size: Some(10),
            page_token: Some("p2".into()),
            sort_by: Some("created_at desc".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn no_pipeline_id_returns_empty_token_without_fetching() {
        let mock = Arc::new(MockApi::new());
        let (mut l, errors) = list(&mock, None);
        l.apply_response(Ok(ListPipelineVersionsResponse { versions: Some(vec![version("v0")]), ..Default::default() }));
        assert_eq!(l.load_pipeline_versions(&request()).await, "");
        assert_eq!(l.versions(), [version("v0")]);
        assert_eq!(mock.call_count(), 0);
        assert!(errors.borrow().is_empty());
    }

    #[tokio::test]
    async fn success_replaces_versions_and_returns_next_token() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Ok(ListPipelineVersionsResponse {
            versions: Some(vec![version("v1"), version("v2")]),
            next_page_token: Some("tok".into()),
            total_size: Some(2),
        }));
        let (mut l, _) = list(&mock, Some("p1"));
        assert_eq!(l.load_pipeline_versions(&request()).await, "tok");
        assert_eq!(l.versions(), [version("v1"), version("v2")]);
        assert_eq!(
            mock.calls(),
            vec![MockCall::ListVersions {
                resource_type: ResourceType::Pipeline,
                pipeline_id: "p1".into(),
                page_size: Some(10),
                page_token: Some("p2".into()),
                sort_by: Some("created_at desc".into()),
            }]
        );
    }

    #[tokio::test]
    async fn missing_versions_become_empty_list() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Ok(ListPipelineVersionsResponse::default()));
        let (mut l, _) = list(&mock, Some("p1"));
        l.apply_response(Ok(ListPipelineVersionsResponse { versions: Some(vec![version("v0")]), ..Default::default() }));
        assert_eq!(l.load_pipeline_versions(&request()).await, "");
        assert!(l.versions().is_empty());
    }

    #[tokio::test]
    async fn failure_reports_fixed_message_and_keeps_list() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Err(ApiError::Http { status: 500, body: r#"{"error":"db down"}"#.into() }));
        let (mut l, errors) = list(&mock, Some("p1"));
        l.apply_response(Ok(ListPipelineVersionsResponse { versions: Some(vec![version("v0")]), ..Default::default() }));
        assert_eq!(l.load_pipeline_versions(&request()).await, "");
        assert_eq!(l.versions(), [version("v0")]);
        assert_eq!(*errors.borrow(), vec![(FAILED_TO_LIST.to_string(), "db down".to_string())]);
    }

    #[tokio::test]
    async fn background_load_feeds_table_paging() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Ok(ListPipelineVersionsResponse {
            versions: Some(vec![version("v1")]),
            next_page_token: Some("t1".into()),
            total_size: None,
        }));
        let (mut l, _) = list(&mock, Some("p1"));
        let req = l.table.state.begin_reload();
        assert_eq!(req.sort_by.as_deref(), Some("created_at desc"));
        l.start_load(req);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(l.poll());
        assert_eq!(l.rows()[0].id, "v1");
        assert_eq!(l.table_state().tokens(), ["", "t1"]);
        assert!(!l.table_state().is_loading());
    }

    #[tokio::test]
    async fn no_pipeline_id_finishes_reload_immediately() {
        let mock = Arc::new(MockApi::new());
        let (mut l, _) = list(&mock, None);
        let req = l.table.state.begin_reload();
        l.start_load(req);
        assert!(!l.table_state().is_loading());
        assert_eq!(l.table_state().max_page_index(), 0);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_background_load_keeps_paging_and_retry_recovers() {
        let mock = Arc::new(MockApi::new());
        mock.set_versions(Err(ApiError::Transport("refused".into())));
        let (mut l, errors) = list(&mock, Some("p1"));
        let req = l.table.state.begin_reload();
        l.start_load(req);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(l.poll());
        assert_eq!(errors.borrow().len(), 1);
        assert!(!l.table_state().is_loading());
        assert_eq!(l.table_state().current_page(), 0);
        assert_eq!(l.table_state().max_page_index(), usize::MAX);

        mock.set_versions(Ok(ListPipelineVersionsResponse {
            versions: Some(vec![version("v1")]),
            next_page_token: Some("t1".into()),
            total_size: None,
        }));
        let req = l.table.state.begin_reload();
        l.start_load(req);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(l.poll());
        assert_eq!(l.table_state().tokens(), ["", "t1"]);
        assert!(l.table_state().can_next());
    }

    #[test]
    fn name_link_targets_version_details() {
        assert_eq!(version_details_path(Some("p1"), "v1"), "/pipelines/details/p1/version/v1");
        let rows = pipeline_version_rows(&[version("v1")]);
        assert_eq!(rows[0].fields[0], "name-v1");
    }
}
