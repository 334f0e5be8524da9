#![forbid(unsafe_code)]

use std::path::Path;

use pipeview_core::node_details::SelectedNodeInfo;

pub mod highlight;

/// Read a selected-node JSON file (as exported by the graph view).
pub(crate) fn load_node_info(path: &Path) -> Result<SelectedNodeInfo, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    SelectedNodeInfo::from_json(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_node_info_file_reports_path() {
        let err = load_node_info(Path::new("/nonexistent/node.json")).unwrap_err();
        assert!(err.starts_with("/nonexistent/node.json: "));
    }
}
