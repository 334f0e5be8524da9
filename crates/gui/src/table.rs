//! Server-paged table: token paging, sorting, selection and a name filter.
//!
//! [`TableState`] holds the paging bookkeeping and turns user actions into
//! [`ListRequest`]s. The owner performs the fetch and reports the next page
//! token back through [`TableState::finish_reload`]. [`CustomTable`] draws
//! the state with `egui_table`.

#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use eframe::egui;
use egui_table::{CellInfo, Column, HeaderCellInfo, HeaderRow, Table, TableDelegate};
use pipeview_core::columns::{ColumnKind, ColumnSpec, Row};
use pipeview_core::ListRequest;
use tracing::debug;

pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 10;
const FILTER_DEBOUNCE_MS: u64 = 300;
const SELECT_COL_W: f32 = 28.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableFlags {
    pub disable_paging: bool,
    pub disable_selection: bool,
    pub disable_sorting: bool,
    pub no_filter_box: bool,
}

/// What a cell click asks the table to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellAction {
    None,
    SelectRow,
    Navigate(String),
}

/// Work for the table's owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableEvent {
    Reload(ListRequest),
    SelectionChanged(Vec<String>),
    Navigate(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingReload {
    Page(usize),
    FirstPage,
}

/// Closest entry of [`PAGE_SIZES`]; ties go to the smaller size.
pub fn nearest_page_size(n: u32) -> u32 {
    PAGE_SIZES.iter().copied().min_by_key(|s| s.abs_diff(n)).unwrap_or(DEFAULT_PAGE_SIZE)
}

/// `name IS_SUBSTRING <text>` predicate, or nothing for an empty filter.
pub fn encode_name_filter(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    Some(
        serde_json::json!({
            "predicates": [{ "key": "name", "op": "IS_SUBSTRING", "string_value": text }]
        })
        .to_string(),
    )
}

#[derive(Clone, Debug)]
pub struct TableState {
    flags: TableFlags,
    page_size: u32,
    tokens: Vec<String>,
    current_page: usize,
    max_page_index: usize,
    sort_by: Option<String>,
    sort_order: SortOrder,
    filter: String,
    selected: Vec<String>,
    pending: Option<PendingReload>,
}

impl TableState {
    pub fn new(flags: TableFlags, initial_sort: Option<&str>, initial_order: SortOrder, page_size: u32) -> Self {
        let page_size = if PAGE_SIZES.contains(&page_size) { page_size } else { DEFAULT_PAGE_SIZE };
        Self {
            flags,
            page_size,
            tokens: vec![String::new()],
            current_page: 0,
            max_page_index: usize::MAX,
            sort_by: initial_sort.map(str::to_string),
            sort_order: initial_order,
            filter: String::new(),
            selected: Vec::new(),
            pending: None,
        }
    }

    pub fn flags(&self) -> &TableFlags {
        &self.flags
    }
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
    pub fn current_page(&self) -> usize {
        self.current_page
    }
    pub fn max_page_index(&self) -> usize {
        self.max_page_index
    }
    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }
    pub fn filter(&self) -> &str {
        &self.filter
    }
    pub fn selected(&self) -> &[String] {
        &self.selected
    }
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
    pub fn can_prev(&self) -> bool {
        self.current_page > 0
    }
    pub fn can_next(&self) -> bool {
        self.current_page < self.max_page_index
    }

    fn request(&self, page_token: &str) -> ListRequest {
        let desc = self.sort_order == SortOrder::Desc;
        ListRequest {
            filter: encode_name_filter(&self.filter),
            order_ascending: Some(!desc),
            page_size: Some(self.page_size),
            page_token: (!page_token.is_empty()).then(|| page_token.to_string()),
            sort_by: self
                .sort_by
                .as_ref()
                .map(|s| if desc { format!("{} desc", s) } else { s.clone() }),
        }
    }

    /// Move by `offset` pages (clamped to the known range) and request that page.
    pub fn begin_page_change(&mut self, offset: isize) -> ListRequest {
        let target = (self.current_page as isize).saturating_add(offset).max(0) as usize;
        let page = target.min(self.max_page_index);
        let token = self.tokens.get(page).cloned().unwrap_or_default();
        self.pending = Some(PendingReload::Page(page));
        self.request(&token)
    }

    /// Reload the current page.
    pub fn begin_reload(&mut self) -> ListRequest {
        self.begin_page_change(0)
    }

    /// Request the first page and reset paging once it arrives.
    pub fn begin_first_page(&mut self) -> ListRequest {
        self.pending = Some(PendingReload::FirstPage);
        self.request("")
    }

    /// Record the token returned for the request in flight.
    pub fn finish_reload(&mut self, next_token: &str) {
        match self.pending.take() {
            Some(PendingReload::Page(page)) => {
                if next_token.is_empty() {
                    self.max_page_index = page;
                } else {
                    if page + 1 == self.tokens.len() {
                        self.tokens.push(next_token.to_string());
                    }
                    // a page once seen as last has grown
                    if page >= self.max_page_index {
                        self.max_page_index = usize::MAX;
                    }
                }
                self.current_page = page;
            }
            Some(PendingReload::FirstPage) => {
                self.tokens = vec![String::new()];
                self.current_page = 0;
                if next_token.is_empty() {
                    self.max_page_index = 0;
                } else {
                    self.tokens.push(next_token.to_string());
                    self.max_page_index = usize::MAX;
                }
            }
            None => {}
        }
        debug!(page = self.current_page, tokens = self.tokens.len(), max_page = self.max_page_index, "table: reload done");
    }

    /// Drop the request in flight without touching paging (failed fetch).
    pub fn cancel_reload(&mut self) {
        if self.pending.take().is_some() {
            debug!(page = self.current_page, "table: reload cancelled");
        }
    }

    /// Same column flips the order, a new column starts descending.
    pub fn request_sort(&mut self, sort_key: &str) -> Option<ListRequest> {
        if self.flags.disable_sorting || sort_key.is_empty() {
            return None;
        }
        self.sort_order = if self.sort_by.as_deref() == Some(sort_key) {
            match self.sort_order {
                SortOrder::Asc => SortOrder::Desc,
                SortOrder::Desc => SortOrder::Asc,
            }
        } else {
            SortOrder::Desc
        };
        self.sort_by = Some(sort_key.to_string());
        Some(self.begin_first_page())
    }

    pub fn set_page_size(&mut self, page_size: u32) -> ListRequest {
        self.page_size = page_size;
        self.begin_first_page()
    }

    pub fn set_filter(&mut self, text: &str) -> ListRequest {
        self.filter = text.to_string();
        self.begin_first_page()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn set_selected(&mut self, ids: Vec<String>) {
        self.selected = ids;
    }

    /// Toggle one row; returns the new selection.
    pub fn toggle_selection(&mut self, id: &str) -> Option<Vec<String>> {
        if self.flags.disable_selection {
            return None;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.to_string());
        }
        Some(self.selected.clone())
    }

    /// Select every visible row, or clear if they already all are.
    pub fn toggle_select_all(&mut self, visible: &[String]) -> Option<Vec<String>> {
        if self.flags.disable_selection {
            return None;
        }
        let all = !visible.is_empty() && visible.iter().all(|id| self.is_selected(id));
        self.selected = if all { Vec::new() } else { visible.to_vec() };
        Some(self.selected.clone())
    }

    pub fn apply_cell_action(&mut self, row_id: &str, action: CellAction) -> Option<TableEvent> {
        match action {
            CellAction::None => None,
            CellAction::SelectRow => self.toggle_selection(row_id).map(TableEvent::SelectionChanged),
            CellAction::Navigate(path) => Some(TableEvent::Navigate(path)),
        }
    }
}

/// Draws one custom cell: (ui, column, row, value) -> action.
pub type CellRenderer<'a> = dyn FnMut(&mut egui::Ui, &ColumnSpec, &Row, &str) -> CellAction + 'a;

pub struct CustomTable {
    id: &'static str,
    columns: Vec<ColumnSpec>,
    pub state: TableState,
    empty_message: String,
    filter_input: String,
    filter_changed_at: Option<Instant>,
}

impl CustomTable {
    pub fn new(id: &'static str, columns: Vec<ColumnSpec>, state: TableState, empty_message: impl Into<String>) -> Self {
        Self {
            id,
            columns,
            state,
            empty_message: empty_message.into(),
            filter_input: String::new(),
            filter_changed_at: None,
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn empty_message(&self) -> &str {
        &self.empty_message
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, rows: &[Row], cell: &mut CellRenderer<'_>) -> Vec<TableEvent> {
        let mut events = Vec::new();
        let flags = self.state.flags().clone();

        ui.horizontal(|ui| {
            if !flags.no_filter_box {
                ui.label("Filter:");
                let resp = ui.add(egui::TextEdit::singleline(&mut self.filter_input).hint_text("name contains…"));
                if resp.changed() {
                    self.filter_changed_at = Some(Instant::now());
                }
            }
            if self.state.is_loading() {
                ui.add(egui::Spinner::new());
            }
            if !flags.disable_paging {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_enabled(self.state.can_next(), egui::Button::new("›")).clicked() {
                        events.push(TableEvent::Reload(self.state.begin_page_change(1)));
                    }
                    ui.label(format!("Page {}", self.state.current_page() + 1));
                    if ui.add_enabled(self.state.can_prev(), egui::Button::new("‹")).clicked() {
                        events.push(TableEvent::Reload(self.state.begin_page_change(-1)));
                    }
                    ui.separator();
                    let mut size = self.state.page_size();
                    egui::ComboBox::from_id_salt((self.id, "page_size"))
                        .selected_text(size.to_string())
                        .show_ui(ui, |ui| {
                            for s in PAGE_SIZES {
                                ui.selectable_value(&mut size, s, s.to_string());
                            }
                        });
                    ui.label("Rows per page:");
                    if size != self.state.page_size() {
                        events.push(TableEvent::Reload(self.state.set_page_size(size)));
                    }
                });
            }
        });
        if let Some(at) = self.filter_changed_at {
            if at.elapsed() >= Duration::from_millis(FILTER_DEBOUNCE_MS) {
                self.filter_changed_at = None;
                if self.filter_input != self.state.filter() {
                    events.push(TableEvent::Reload(self.state.set_filter(&self.filter_input)));
                }
            } else {
                ui.ctx().request_repaint_after(Duration::from_millis(FILTER_DEBOUNCE_MS));
            }
        }

        if rows.is_empty() {
            if !self.state.is_loading() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(&self.empty_message).italics().weak());
            }
            return events;
        }

        let sel_col = !flags.disable_selection;
        let total_flex: f32 = self.columns.iter().map(|c| c.flex).sum::<f32>().max(1.0);
        let avail = ui.available_width() - if sel_col { SELECT_COL_W } else { 0.0 };
        let unit = (avail / total_flex).max(24.0);
        let mut cols: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        if sel_col {
            cols.push(Column::new(SELECT_COL_W));
        }
        cols.extend(self.columns.iter().map(|c| Column::new(c.flex * unit).resizable(true)));
        let mut delegate = TableView { columns: &self.columns, rows, state: &mut self.state, cell, events: &mut events, sel_col };
        Table::new()
            .id_salt(self.id)
            .headers(vec![HeaderRow::new(22.0)])
            .num_rows(rows.len() as u64)
            .columns(cols)
            .show(ui, &mut delegate);
        events
    }
}

struct TableView<'a, 'r> {
    columns: &'a [ColumnSpec],
    rows: &'a [Row],
    state: &'a mut TableState,
    cell: &'a mut CellRenderer<'r>,
    events: &'a mut Vec<TableEvent>,
    sel_col: bool,
}

impl TableView<'_, '_> {
    fn spec(&self, col: usize) -> Option<&ColumnSpec> {
        let off = usize::from(self.sel_col);
        col.checked_sub(off).and_then(|c| self.columns.get(c))
    }
}

impl TableDelegate for TableView<'_, '_> {
    fn prepare(&mut self, _info: &egui_table::PrefetchInfo) {}

    fn header_cell_ui(&mut self, ui: &mut egui::Ui, cell: &HeaderCellInfo) {
        let rect = ui.max_rect();
        ui.painter().rect_filled(rect, 0.0, ui.visuals().widgets.inactive.bg_fill);
        let col = cell.col_range.start as usize;
        if self.sel_col && col == 0 {
            let ids: Vec<String> = self.rows.iter().map(|r| r.id.clone()).collect();
            let mut all = !ids.is_empty() && ids.iter().all(|id| self.state.is_selected(id));
            if ui.checkbox(&mut all, "").clicked() {
                if let Some(sel) = self.state.toggle_select_all(&ids) {
                    self.events.push(TableEvent::SelectionChanged(sel));
                }
            }
            return;
        }
        let Some(spec) = self.spec(col).cloned() else { return };
        let sortable = spec.sort_key.is_some() && !self.state.flags().disable_sorting;
        let is_sorted = sortable && spec.sort_key == self.state.sort_by();
        let mut text = spec.label.to_string();
        if is_sorted {
            text.push_str(if self.state.sort_order() == SortOrder::Asc { " ↑" } else { " ↓" });
        }
        ui.add_space(2.0);
        if sortable {
            if ui.selectable_label(is_sorted, egui::RichText::new(text).strong()).clicked() {
                if let Some(req) = spec.sort_key.and_then(|k| self.state.request_sort(k)) {
                    self.events.push(TableEvent::Reload(req));
                }
            }
        } else {
            ui.label(egui::RichText::new(text).strong());
        }
    }

    fn cell_ui(&mut self, ui: &mut egui::Ui, cell: &CellInfo) {
        let idx = cell.row_nr as usize;
        let col = cell.col_nr as usize;
        let rows = self.rows;
        let Some(row) = rows.get(idx) else { return };
        let is_sel = self.state.is_selected(&row.id);
        let rect = ui.max_rect();
        if is_sel {
            ui.painter().rect_filled(rect, 0.0, ui.visuals().selection.bg_fill);
        } else if idx % 2 == 0 {
            ui.painter().rect_filled(rect, 0.0, ui.visuals().faint_bg_color);
        }
        if self.sel_col && col == 0 {
            let mut checked = is_sel;
            if ui.checkbox(&mut checked, "").clicked() {
                if let Some(ev) = self.state.apply_cell_action(&row.id, CellAction::SelectRow) {
                    self.events.push(ev);
                }
            }
            return;
        }
        let Some(spec) = self.spec(col).cloned() else { return };
        let value = row.fields.get(col - usize::from(self.sel_col)).map(String::as_str).unwrap_or("");
        let action = match spec.kind {
            ColumnKind::Text => {
                if ui.selectable_label(is_sel, value).clicked() {
                    CellAction::SelectRow
                } else {
                    CellAction::None
                }
            }
            _ => (self.cell)(ui, &spec, row, value),
        };
        if let Some(ev) = self.state.apply_cell_action(&row.id, action) {
            self.events.push(ev);
        }
    }

    fn default_row_height(&self) -> f32 {
        22.0
    }
}
