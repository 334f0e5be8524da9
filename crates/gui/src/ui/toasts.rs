#![forbid(unsafe_code)]

use eframe::egui;
use std::time::Instant;

use crate::model::{Toast, ToastKind};
use crate::PipeviewApp;

impl PipeviewApp {
    pub(crate) fn toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        let text = text.into();
        // identical text already on screen: restart its timer instead
        if let Some(t) = self.toasts.iter_mut().find(|t| t.text == text && t.kind == kind) {
            t.created = Instant::now();
            return;
        }
        self.toasts.push(Toast { text, kind, created: Instant::now(), duration_ms: kind.duration_ms() });
    }
}

pub(crate) fn draw_toasts(app: &mut PipeviewApp, ctx: &egui::Context) {
    let now = Instant::now();
    app.toasts.retain(|t| now.duration_since(t.created).as_millis() < t.duration_ms as u128);
    if app.toasts.is_empty() { return; }
    egui::Area::new(egui::Id::new("toasts_area"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -40.0))
        .show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;
            for t in app.toasts.iter() {
                let (bg, fg) = match t.kind {
                    ToastKind::Info => (ui.visuals().widgets.inactive.bg_fill, ui.visuals().strong_text_color()),
                    ToastKind::Success => (egui::Color32::from_rgb(34, 139, 34), egui::Color32::WHITE),
                    ToastKind::Warn => (egui::Color32::from_rgb(202, 138, 4), egui::Color32::BLACK),
                    ToastKind::Error => (egui::Color32::from_rgb(185, 28, 28), egui::Color32::WHITE),
                };
                egui::Frame::new()
                    .fill(bg)
                    .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
                    .corner_radius(6)
                    .inner_margin(egui::Margin::symmetric(10, 6))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&t.text).color(fg));
                    });
            }
        });
    // keep expiring toasts moving
    ctx.request_repaint_after(std::time::Duration::from_millis(250));
}
