//! Column specs and row shaping for the pipeline version table.

#![forbid(unsafe_code)]

use crate::format::format_date_string;
use crate::{PipelineVersion, PipelineVersionSortKey};

/// How a column's cells are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Plain text.
    Text,
    /// Tooltip-wrapped link to the version details page.
    VersionLink,
    /// Tooltip-wrapped description forced onto one line.
    Description,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub label: &'static str,
    /// Relative width weight.
    pub flex: f32,
    pub sort_key: Option<&'static str>,
    pub kind: ColumnKind,
}

/// A table row: stable id plus display values aligned with the columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub fields: Vec<String>,
}

pub const VERSION_NAME: &str = "Version name";
pub const DESCRIPTION: &str = "Description";
pub const UPLOADED_ON: &str = "Uploaded on";

fn col(label: &'static str, flex: f32, sort_key: Option<&'static str>, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { label, flex, sort_key, kind }
}

pub fn pipeline_version_columns() -> Vec<ColumnSpec> {
    vec![
        col(VERSION_NAME, 1.0, Some(PipelineVersionSortKey::Name.as_str()), ColumnKind::VersionLink),
        col(DESCRIPTION, 3.0, None, ColumnKind::Description),
        col(UPLOADED_ON, 1.0, Some(PipelineVersionSortKey::CreatedAt.as_str()), ColumnKind::Text),
    ]
}

pub fn pipeline_version_rows(versions: &[PipelineVersion]) -> Vec<Row> {
    versions
        .iter()
        .map(|v| Row {
            id: v.id.clone().unwrap_or_default(),
            fields: vec![
                v.name.clone().unwrap_or_default(),
                v.description.clone().unwrap_or_default(),
                format_date_string(v.created_at.as_ref()),
            ],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_columns_have_expected_sort_keys() {
        let cols = pipeline_version_columns();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].sort_key, Some("name"));
        assert_eq!(cols[1].sort_key, None);
        assert_eq!(cols[2].sort_key, Some("created_at"));
        assert_eq!(cols[1].flex, 3.0);
    }

    #[test]
    fn rows_follow_column_order() {
        let v = PipelineVersion {
            id: Some("v1".into()),
            name: Some("first".into()),
            description: None,
            ..Default::default()
        };
        let rows = pipeline_version_rows(&[v]);
        assert_eq!(rows[0].id, "v1");
        assert_eq!(rows[0].fields, vec!["first".to_string(), String::new(), "-".to_string()]);
    }
}
