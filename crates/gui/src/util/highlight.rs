#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, TextStyle};
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

// Galleys keyed by text/theme/width; pod YAML is redrawn every frame.
static GALLEYS: Lazy<Mutex<HashMap<u64, Arc<egui::Galley>>>> = Lazy::new(|| Mutex::new(HashMap::new()));
const GALLEY_CAP: usize = 32;

fn to_color32(c: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn galley_key(s: &str, dark: bool, wrap: f32) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut h = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut h);
    dark.hash(&mut h);
    let q = ((wrap / 8.0).round() as i32).max(0);
    q.hash(&mut h);
    h.finish()
}

fn theme(dark: bool) -> Option<&'static Theme> {
    let name = if dark { "base16-ocean.dark" } else { "InspiredGitHub" };
    THEME_SET
        .themes
        .get(name)
        .or_else(|| THEME_SET.themes.get("Solarized (dark)"))
        .or_else(|| THEME_SET.themes.values().next())
}

/// YAML syntax colouring for a read-only `TextEdit`.
pub fn yaml_layouter() -> impl FnMut(&egui::Ui, &dyn egui::TextBuffer, f32) -> Arc<egui::Galley> {
    move |ui: &egui::Ui, text: &dyn egui::TextBuffer, wrap_width: f32| {
        let dark = ui.style().visuals.dark_mode;
        let s = text.as_str();
        let key = galley_key(s, dark, wrap_width);
        if let Some(g) = GALLEYS.lock().ok().and_then(|m| m.get(&key).cloned()) {
            return g;
        }
        let mono = TextStyle::Monospace.resolve(ui.style());
        let plain = TextFormat { font_id: mono.clone(), color: ui.visuals().text_color(), ..Default::default() };
        let mut job = LayoutJob::default();
        job.wrap.max_width = wrap_width;
        let syntax = SYNTAX_SET
            .find_syntax_by_extension("yaml")
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        match theme(dark) {
            Some(theme) => {
                let mut h = HighlightLines::new(syntax, theme);
                for line in s.split_inclusive('\n') {
                    let regions = h.highlight_line(line.trim_end_matches('\n'), &SYNTAX_SET).unwrap_or_default();
                    for (style, piece) in regions {
                        job.append(piece, 0.0, TextFormat { font_id: mono.clone(), color: to_color32(style.foreground), ..Default::default() });
                    }
                    if line.ends_with('\n') {
                        job.append("\n", 0.0, plain.clone());
                    }
                }
            }
            None => job.append(s, 0.0, plain),
        }
        let galley = ui.fonts(|f| f.layout_job(job));
        if let Ok(mut m) = GALLEYS.lock() {
            if m.len() > GALLEY_CAP {
                m.clear();
            }
            m.insert(key, galley.clone());
        }
        galley
    }
}
