#![forbid(unsafe_code)]

use eframe::egui;
use pipeview_core::node_details::{node_detail_blocks, pretty_json_value, DetailBlock, KeyValue, SelectedNodeInfo};

fn details_table(ui: &mut egui::Ui, title: &str, fields: &[KeyValue]) {
    ui.add_space(8.0);
    ui.label(egui::RichText::new(title).strong().size(15.0));
    let rows: Vec<&KeyValue> = fields.iter().filter(|kv| !(kv.0.is_empty() && kv.1.is_empty())).collect();
    if rows.is_empty() {
        return;
    }
    egui::Grid::new(("details_table", title))
        .num_columns(2)
        .striped(true)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            for KeyValue(key, value) in rows {
                ui.label(egui::RichText::new(key).weak());
                match pretty_json_value(value) {
                    Some(pretty) => ui.label(egui::RichText::new(pretty).monospace()),
                    None => ui.label(value),
                };
                ui.end_row();
            }
        });
}

/// Draw the static details of a selected graph node.
pub fn node_details_ui(ui: &mut egui::Ui, info: &SelectedNodeInfo) {
    for block in node_detail_blocks(info) {
        match block {
            DetailBlock::Table { title, fields } => details_table(ui, title, &fields),
            DetailBlock::Header(h) => {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(h).strong().size(15.0));
            }
            DetailBlock::Mono(line) => {
                ui.label(egui::RichText::new(line).monospace());
            }
            DetailBlock::Title(t) => {
                ui.add_space(20.0);
                ui.label(egui::RichText::new(t).strong());
            }
            DetailBlock::Text(s) => {
                ui.label(s);
            }
        }
    }
}
