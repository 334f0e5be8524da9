#![forbid(unsafe_code)]

use eframe::egui;

use crate::util::highlight::yaml_layouter;

/// Width of the line-number gutter for `lines` lines.
pub(crate) fn gutter_digits(lines: usize) -> usize {
    ((lines.max(1) as f32).log10().floor() as usize + 1).max(2)
}

/// Zero-based line of a caret (char index), clamped to the text.
pub(crate) fn line_of(text: &str, char_idx: usize) -> usize {
    text.chars().take(char_idx).filter(|&c| c == '\n').count()
}

/// Read-only YAML editor: line numbers, syntax colours, caret line highlight.
/// Fills the space it is given.
pub fn yaml_editor(ui: &mut egui::Ui, id_salt: impl std::hash::Hash, text: &str) {
    let lines = text.lines().count().max(1);
    let digits = gutter_digits(lines);
    let mono = egui::TextStyle::Monospace;
    let row_h = ui.text_style_height(&mono);
    let gutter_w = 8.0 + digits as f32 * 8.0;
    let id = ui.make_persistent_id(&id_salt);
    egui::ScrollArea::both()
        .id_salt(id)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                let mut nums = String::with_capacity((digits + 1) * lines);
                for i in 1..=lines {
                    nums.push_str(&format!("{i:>width$}\n", width = digits));
                }
                let total_h = (lines as f32) * row_h + 8.0;
                let (gutter, _) = ui.allocate_exact_size(egui::vec2(gutter_w, total_h), egui::Sense::hover());
                ui.painter().rect_filled(gutter, 0.0, ui.visuals().extreme_bg_color);
                ui.painter().text(
                    gutter.left_top() + egui::vec2(4.0, 4.0),
                    egui::Align2::LEFT_TOP,
                    nums,
                    mono.resolve(ui.style()),
                    ui.visuals().weak_text_color(),
                );

                let mut layouter = yaml_layouter();
                let mut view = text;
                let out = egui::TextEdit::multiline(&mut view)
                    .id(id.with("text"))
                    .font(egui::TextStyle::Monospace)
                    .desired_rows(lines)
                    .desired_width(f32::INFINITY)
                    .layouter(&mut layouter)
                    .show(ui);

                if let Some(cr) = out.cursor_range {
                    let line = line_of(text, cr.primary.index);
                    let y = out.response.rect.top() + 4.0 + (line as f32) * row_h;
                    let bg = ui.visuals().selection.bg_fill.linear_multiply(0.25);
                    let band = egui::Rect::from_min_size(
                        egui::pos2(gutter.left(), y),
                        egui::vec2(gutter.width() + out.response.rect.width(), row_h),
                    );
                    ui.painter().rect_filled(band, 0.0, bg);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gutter_is_at_least_two_digits() {
        assert_eq!(gutter_digits(0), 2);
        assert_eq!(gutter_digits(9), 2);
        assert_eq!(gutter_digits(100), 3);
        assert_eq!(gutter_digits(12_345), 5);
    }

    #[test]
    fn caret_line_counts_newlines_before_offset() {
        let text = "a: 1\nb:\n  c: 2\n";
        assert_eq!(line_of(text, 0), 0);
        assert_eq!(line_of(text, 5), 1);
        assert_eq!(line_of(text, 9), 2);
        assert_eq!(line_of(text, 999), 3);
    }

    #[test]
    fn caret_index_counts_chars_not_bytes() {
        assert_eq!(line_of("é\nx", 1), 0);
        assert_eq!(line_of("é\nx", 2), 1);
    }
}
