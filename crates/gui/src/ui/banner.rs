#![forbid(unsafe_code)]

use eframe::egui;

use crate::model::{BannerMode, DialogProps};

#[derive(Clone, Copy, Debug, Default)]
pub struct BannerResponse {
    pub details_clicked: bool,
    pub refresh_clicked: bool,
}

fn colors(mode: BannerMode, visuals: &egui::Visuals) -> (egui::Color32, egui::Color32) {
    match mode {
        BannerMode::Error => (egui::Color32::from_rgb(185, 28, 28), egui::Color32::WHITE),
        BannerMode::Warning => (egui::Color32::from_rgb(202, 138, 4), egui::Color32::BLACK),
        BannerMode::Info => (visuals.widgets.inactive.bg_fill, visuals.strong_text_color()),
    }
}

/// One-line banner with optional Details and Refresh buttons.
pub fn banner_ui(
    ui: &mut egui::Ui,
    message: &str,
    mode: BannerMode,
    has_details: bool,
    has_refresh: bool,
) -> BannerResponse {
    let (bg, fg) = colors(mode, ui.visuals());
    let mut out = BannerResponse::default();
    egui::Frame::new()
        .fill(bg)
        .corner_radius(4)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(message).color(fg));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if has_refresh && ui.button("Refresh").clicked() {
                        out.refresh_clicked = true;
                    }
                    if has_details && ui.button("Details").clicked() {
                        out.details_clicked = true;
                    }
                });
            });
        });
    out
}

/// Window with the banner's detail text. Returns false once closed.
pub fn details_window(ctx: &egui::Context, id: egui::Id, title: &str, text: &str) -> bool {
    let mut open = true;
    let mut dismissed = false;
    egui::Window::new(title)
        .id(id)
        .collapsible(false)
        .resizable(true)
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                ui.label(egui::RichText::new(text).monospace());
            });
            ui.separator();
            if ui.button("Dismiss").clicked() {
                dismissed = true;
            }
        });
    open && !dismissed
}

/// Modal-style dialog from page chrome. Returns true when a button was clicked.
pub fn dialog_ui(ctx: &egui::Context, props: &DialogProps) -> bool {
    if !props.open {
        return false;
    }
    let mut clicked = false;
    let mut open = true;
    egui::Window::new(props.title.clone().unwrap_or_default())
        .id(egui::Id::new("page_dialog"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .open(&mut open)
        .show(ctx, |ui| {
            if let Some(content) = &props.content {
                ui.label(content);
            }
            ui.separator();
            ui.horizontal(|ui| {
                for b in &props.buttons {
                    if ui.button(&b.text).clicked() {
                        clicked = true;
                    }
                }
            });
        });
    clicked || !open
}
