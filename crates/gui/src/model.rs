#![forbid(unsafe_code)]

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// UI callback held by chrome state (banner retry, toolbar actions).
pub type Callback = Rc<dyn Fn()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BannerMode {
    #[default]
    Error,
    Warning,
    Info,
}

/// Page-level banner. An empty message means no banner is shown.
#[derive(Clone, Default)]
pub struct BannerProps {
    pub message: Option<String>,
    pub additional_info: Option<String>,
    pub mode: Option<BannerMode>,
    pub refresh: Option<Callback>,
}

impl BannerProps {
    pub fn is_empty(&self) -> bool {
        self.message.as_deref().map(str::is_empty).unwrap_or(true)
    }
}

impl fmt::Debug for BannerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerProps")
            .field("message", &self.message)
            .field("additional_info", &self.additional_info)
            .field("mode", &self.mode)
            .field("refresh", &self.refresh.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogButton {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogProps {
    pub open: bool,
    pub title: Option<String>,
    pub content: Option<String>,
    pub buttons: Vec<DialogButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub display_name: String,
    pub href: String,
}

#[derive(Clone)]
pub struct ToolbarAction {
    pub title: String,
    pub tooltip: String,
    pub disabled: bool,
    pub action: Callback,
}

impl fmt::Debug for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarAction")
            .field("title", &self.title)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ToolbarProps {
    pub page_title: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub actions: Vec<ToolbarAction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnackbarProps {
    pub open: bool,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind { Info, Success, Warn, Error }

impl ToastKind {
    pub fn duration_ms(&self) -> u64 {
        match self {
            ToastKind::Error => 6000,
            ToastKind::Warn => 4000,
            ToastKind::Info | ToastKind::Success => 2500,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub created: Instant,
    pub duration_ms: u64,
}

/// Which page the shell is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Versions,
    RunNode,
}

impl Route {
    pub fn label(&self) -> &'static str {
        match self {
            Route::Versions => "Pipeline versions",
            Route::RunNode => "Run node",
        }
    }
}

/// Text typed into the top bar; committed to pages on Enter or Load.
#[derive(Clone, Debug, Default)]
pub struct TopbarInputs {
    pub pipeline_id: String,
    pub pod_name: String,
    pub namespace: String,
}
