#![forbid(unsafe_code)]

use eframe::egui;

use crate::PipeviewApp;

const HISTORY_SHOWN: usize = 3;

pub(crate) fn ui_statusbar(app: &mut PipeviewApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("bottom_bar")
        .default_height(24.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(app.route_path()).monospace());
                if app.history.len() > 1 {
                    ui.separator();
                    let recent: Vec<&str> = app
                        .history
                        .iter()
                        .rev()
                        .skip(1)
                        .take(HISTORY_SHOWN)
                        .map(String::as_str)
                        .collect();
                    ui.label(egui::RichText::new(format!("back: {}", recent.join(" ‹ "))).weak())
                        .on_hover_text(app.history.join("\n"));
                }
                if let Some(err) = &app.last_error {
                    ui.separator();
                    ui.label(egui::RichText::new(err).color(ui.visuals().warn_fg_color));
                }
                if !app.log.is_empty() {
                    ui.separator();
                    ui.label(&app.log);
                }
            });
        });
}
