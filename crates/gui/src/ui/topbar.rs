#![forbid(unsafe_code)]

use eframe::egui;

use crate::model::{BannerMode, Route};
use crate::ui::banner::banner_ui;
use crate::PipeviewApp;

fn submitted(ui: &egui::Ui, resp: &egui::Response) -> bool {
    resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}

pub(crate) fn ui_topbar(app: &mut PipeviewApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Pipeview");
            ui.separator();
            for route in [Route::Versions, Route::RunNode] {
                if ui.selectable_label(app.route() == route, route.label()).clicked() {
                    app.navigate_to(route);
                }
            }
            ui.separator();
            let mut apply = false;
            match app.route() {
                Route::Versions => {
                    ui.label("Pipeline:");
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut app.inputs.pipeline_id)
                            .hint_text("pipeline id")
                            .desired_width(260.0),
                    );
                    apply |= submitted(ui, &resp);
                }
                Route::RunNode => {
                    ui.label("Pod:");
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut app.inputs.pod_name)
                            .hint_text("pod name")
                            .desired_width(220.0),
                    );
                    apply |= submitted(ui, &resp);
                    ui.label("Namespace:");
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut app.inputs.namespace)
                            .hint_text("namespace")
                            .desired_width(140.0),
                    );
                    apply |= submitted(ui, &resp);
                }
            }
            if ui.button("Load").clicked() {
                apply = true;
            }
            if apply {
                app.apply_inputs();
            }
            if app.route() == Route::RunNode {
                ui.separator();
                if ui
                    .button("Node info…")
                    .on_hover_text("Open a selected-node JSON file")
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Choose node info JSON")
                        .add_filter("JSON", &["json"])
                        .pick_file()
                    {
                        app.open_node_info(&path);
                    }
                }
                if let Some(src) = &app.node_info_source {
                    ui.label(egui::RichText::new(src).weak());
                }
            }
        });
    });
}

/// Page toolbar (breadcrumbs, title, actions) and the page banner.
pub(crate) fn ui_page_header(app: &mut PipeviewApp, ui: &mut egui::Ui) {
    let toolbar = app.chrome.toolbar();
    ui.horizontal(|ui| {
        for crumb in &toolbar.breadcrumbs {
            ui.label(egui::RichText::new(&crumb.display_name).weak()).on_hover_text(&crumb.href);
            ui.label(egui::RichText::new("›").weak());
        }
        ui.heading(&toolbar.page_title);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            for action in toolbar.actions.iter().rev() {
                let resp = ui
                    .add_enabled(!action.disabled, egui::Button::new(&action.title))
                    .on_hover_text(&action.tooltip);
                if resp.clicked() {
                    (action.action)();
                }
            }
        });
    });

    let banner = app.chrome.banner();
    if let Some(message) = banner.message.as_deref().filter(|m| !m.is_empty()) {
        let details = banner.additional_info.as_deref().filter(|d| !d.is_empty());
        let resp = banner_ui(
            ui,
            message,
            banner.mode.unwrap_or(BannerMode::Error),
            details.is_some(),
            banner.refresh.is_some(),
        );
        if resp.details_clicked {
            app.banner_details_open = !app.banner_details_open;
        }
        if app.banner_details_open {
            if let Some(d) = details {
                egui::Frame::new()
                    .fill(ui.visuals().extreme_bg_color)
                    .inner_margin(egui::Margin::symmetric(10, 6))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(d).monospace());
                    });
            }
        }
        if resp.refresh_clicked {
            app.banner_details_open = false;
            if let Some(retry) = &banner.refresh {
                retry();
            }
        }
    } else {
        app.banner_details_open = false;
    }
    ui.separator();
}
