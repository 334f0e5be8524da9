//! Page lifecycle and the chrome pages talk to.
//!
//! A page owns a [`PageBase`], which pushes toolbar, banner, dialog and
//! snackbar state into the shell through a [`PageChrome`]. Once the page is
//! torn down every banner/dialog/state update becomes a no-op, so results of
//! loads that finish after navigation never touch the shell.

#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use eframe::egui;
use pipeview_api::{error_to_message, ApiError};

use crate::model::{
    BannerMode, BannerProps, Callback, DialogButton, DialogProps, SnackbarProps, ToolbarProps,
};

/// Suffix appended to a banner message when detail text is available.
pub const CLICK_DETAILS: &str = " Click Details for more information.";
pub const DISMISS: &str = "Dismiss";

/// Shell-side sink for page chrome updates.
pub trait PageChrome {
    fn update_toolbar(&self, props: ToolbarProps);
    fn update_banner(&self, props: BannerProps);
    fn update_dialog(&self, props: DialogProps);
    fn update_snackbar(&self, props: SnackbarProps);
    /// Request a route change; the shell applies it after the frame.
    fn navigate(&self, path: String);
}

/// Anything a page can resolve into banner detail text.
pub trait ToMessage {
    fn to_message(&self) -> String;
}

impl ToMessage for ApiError {
    fn to_message(&self) -> String {
        error_to_message(self)
    }
}

impl ToMessage for &str {
    fn to_message(&self) -> String {
        self.to_string()
    }
}

impl ToMessage for String {
    fn to_message(&self) -> String {
        self.clone()
    }
}

#[derive(Default, Debug)]
pub struct ChromeState {
    pub toolbar: ToolbarProps,
    pub banner: BannerProps,
    pub dialog: DialogProps,
    pub snackbar: Option<SnackbarProps>,
    pub navigation: Option<String>,
}

/// The shell's chrome, shared by the app and whichever page is mounted.
#[derive(Clone, Default)]
pub struct SharedChrome(Rc<RefCell<ChromeState>>);

impl SharedChrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toolbar(&self) -> ToolbarProps {
        self.0.borrow().toolbar.clone()
    }

    pub fn banner(&self) -> BannerProps {
        self.0.borrow().banner.clone()
    }

    pub fn dialog(&self) -> DialogProps {
        self.0.borrow().dialog.clone()
    }

    pub fn dismiss_dialog(&self) {
        self.0.borrow_mut().dialog = DialogProps::default();
    }

    pub fn take_snackbar(&self) -> Option<SnackbarProps> {
        self.0.borrow_mut().snackbar.take()
    }

    pub fn take_navigation(&self) -> Option<String> {
        self.0.borrow_mut().navigation.take()
    }
}

impl PageChrome for SharedChrome {
    fn update_toolbar(&self, props: ToolbarProps) {
        self.0.borrow_mut().toolbar = props;
    }

    fn update_banner(&self, props: BannerProps) {
        self.0.borrow_mut().banner = props;
    }

    fn update_dialog(&self, props: DialogProps) {
        self.0.borrow_mut().dialog = props;
    }

    fn update_snackbar(&self, props: SnackbarProps) {
        self.0.borrow_mut().snackbar = Some(props);
    }

    fn navigate(&self, path: String) {
        self.0.borrow_mut().navigation = Some(path);
    }
}

/// Cloneable handle that reports page errors into the banner.
///
/// Children (e.g. the version list) receive one of these instead of the
/// page itself. It shares the page's mounted flag and refresh request.
#[derive(Clone)]
pub struct PageErrorHandler {
    chrome: Rc<dyn PageChrome>,
    mounted: Rc<Cell<bool>>,
    refresh_requested: Rc<Cell<bool>>,
}

impl PageErrorHandler {
    pub fn show(
        &self,
        message: &str,
        error: Option<&dyn ToMessage>,
        mode: Option<BannerMode>,
        retry: Option<Callback>,
    ) {
        let detail = error.map(|e| e.to_message()).unwrap_or_default();
        if !self.mounted.get() {
            return;
        }
        let (message, additional_info) = if detail.is_empty() {
            (message.to_string(), None)
        } else {
            (format!("{}{}", message, CLICK_DETAILS), Some(detail))
        };
        let flag = self.refresh_requested.clone();
        self.chrome.update_banner(BannerProps {
            message: Some(message),
            additional_info,
            mode: Some(mode.unwrap_or_default()),
            refresh: Some(retry.unwrap_or_else(|| Rc::new(move || flag.set(true)))),
        });
    }
}

pub struct PageBase {
    chrome: Rc<dyn PageChrome>,
    mounted: Rc<Cell<bool>>,
    refresh_requested: Rc<Cell<bool>>,
}

impl PageBase {
    pub fn new(chrome: Rc<dyn PageChrome>) -> Self {
        Self {
            chrome,
            mounted: Rc::new(Cell::new(true)),
            refresh_requested: Rc::new(Cell::new(false)),
        }
    }

    pub fn chrome(&self) -> &Rc<dyn PageChrome> {
        &self.chrome
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Called once the page is on screen: starts with a clean banner.
    pub fn mount(&self) {
        self.clear_banner();
    }

    /// Clears the banner, then marks the page unmounted. Idempotent.
    pub fn teardown(&self) {
        if !self.mounted.get() {
            return;
        }
        self.clear_banner();
        self.mounted.set(false);
    }

    pub fn clear_banner(&self) {
        if !self.mounted.get() {
            return;
        }
        self.chrome.update_banner(BannerProps::default());
    }

    pub fn show_page_error(
        &self,
        message: &str,
        error: Option<&dyn ToMessage>,
        mode: Option<BannerMode>,
        retry: Option<Callback>,
    ) {
        self.error_handler().show(message, error, mode, retry);
    }

    pub fn show_error_dialog(&self, title: &str, content: &str) {
        if !self.mounted.get() {
            return;
        }
        self.chrome.update_dialog(DialogProps {
            open: true,
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            buttons: vec![DialogButton { text: DISMISS.to_string() }],
        });
    }

    pub fn show_snackbar(&self, message: impl Into<String>) {
        if !self.mounted.get() {
            return;
        }
        self.chrome.update_snackbar(SnackbarProps { open: true, message: message.into() });
    }

    pub fn error_handler(&self) -> PageErrorHandler {
        PageErrorHandler {
            chrome: self.chrome.clone(),
            mounted: self.mounted.clone(),
            refresh_requested: self.refresh_requested.clone(),
        }
    }

    /// Callback that asks the page to refresh on its next frame.
    pub fn refresh_callback(&self) -> Callback {
        let flag = self.refresh_requested.clone();
        Rc::new(move || flag.set(true))
    }

    pub fn take_refresh_request(&self) -> bool {
        self.refresh_requested.replace(false)
    }

    /// Applies `patch` only while mounted; returns whether it ran.
    pub fn set_state_safe<S>(&self, state: &mut S, patch: impl FnOnce(&mut S)) -> bool {
        if !self.mounted.get() {
            return false;
        }
        patch(state);
        true
    }

    /// Like [`set_state_safe`](Self::set_state_safe), then runs `then` on the patched state.
    pub fn set_state_safe_then<S>(
        &self,
        state: &mut S,
        patch: impl FnOnce(&mut S),
        then: impl FnOnce(&S),
    ) -> bool {
        if !self.set_state_safe(state, patch) {
            return false;
        }
        then(state);
        true
    }
}

/// A routed screen.
pub trait Page {
    fn base(&self) -> &PageBase;

    /// Toolbar shown while the page is mounted; pushed once at construction.
    fn initial_toolbar_state(&self) -> ToolbarProps;

    fn ui(&mut self, ui: &mut egui::Ui);

    /// Reload the page's data.
    fn refresh(&mut self);

    /// Stop pending work. Runs after the base is torn down.
    fn unmount(&mut self) {}

    /// Per-frame driver: honors a pending retry, then draws.
    fn show(&mut self, ui: &mut egui::Ui) {
        if self.base().take_refresh_request() {
            self.refresh();
        }
        self.ui(ui);
    }

    fn teardown(&mut self) {
        self.base().teardown();
        self.unmount();
    }
}

/// Finish constructing a page: push its toolbar and clear the banner.
pub fn construct<P: Page>(page: P) -> P {
    page.base().chrome().update_toolbar(page.initial_toolbar_state());
    page.base().mount();
    page
}
