//! Static details of a pipeline graph node.
//!
//! [`SelectedNodeInfo`] is built upstream from a parsed workflow graph and is
//! read-only here. [`node_detail_blocks`] turns it into an ordered list of
//! display blocks that frontends render (egui in the GUI, text in the CLI).

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::CoreResult;

pub const INPUT_PARAMETERS: &str = "Input parameters";
pub const OUTPUT_PARAMETERS: &str = "Output parameters";
pub const VOLUME_MOUNTS: &str = "Volume mounts";
pub const MANIFEST: &str = "Manifest";
pub const ARGUMENTS: &str = "Arguments";
pub const COMMAND: &str = "Command";
pub const IMAGE: &str = "Image";
pub const CONDITION: &str = "Condition";
pub const RUN_WHEN: &str = "Run when:";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Container,
    Resource,
    Dag,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A `[key, value]` pair. Decodes from a JSON array of up to two strings;
/// missing entries become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeyValue(pub String, pub String);

impl From<Vec<String>> for KeyValue {
    fn from(v: Vec<String>) -> Self {
        let mut it = v.into_iter();
        let key = it.next().unwrap_or_default();
        let value = it.next().unwrap_or_default();
        KeyValue(key, value)
    }
}

impl From<KeyValue> for Vec<String> {
    fn from(kv: KeyValue) -> Self {
        vec![kv.0, kv.1]
    }
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue(key.into(), value.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedNodeInfo {
    pub node_type: NodeType,
    pub args: Vec<String>,
    pub command: Vec<String>,
    pub condition: String,
    pub image: String,
    pub inputs: Vec<KeyValue>,
    pub outputs: Vec<KeyValue>,
    pub volume_mounts: Vec<KeyValue>,
    pub resource: Vec<KeyValue>,
}

impl SelectedNodeInfo {
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailBlock {
    /// Titled key/value table.
    Table { title: &'static str, fields: Vec<KeyValue> },
    /// Section header.
    Header(&'static str),
    /// One monospace line.
    Mono(String),
    /// Bold task title.
    Title(&'static str),
    /// Plain text line.
    Text(String),
}

pub fn node_detail_blocks(info: &SelectedNodeInfo) -> Vec<DetailBlock> {
    let mut out = Vec::new();
    match info.node_type {
        NodeType::Container => {
            out.push(DetailBlock::Table { title: INPUT_PARAMETERS, fields: info.inputs.clone() });
            out.push(DetailBlock::Table { title: OUTPUT_PARAMETERS, fields: info.outputs.clone() });
            out.push(DetailBlock::Header(ARGUMENTS));
            out.extend(info.args.iter().cloned().map(DetailBlock::Mono));
            out.push(DetailBlock::Header(COMMAND));
            out.extend(info.command.iter().cloned().map(DetailBlock::Mono));
            out.push(DetailBlock::Header(IMAGE));
            out.push(DetailBlock::Mono(info.image.clone()));
            out.push(DetailBlock::Table { title: VOLUME_MOUNTS, fields: info.volume_mounts.clone() });
        }
        NodeType::Resource => {
            out.push(DetailBlock::Table { title: INPUT_PARAMETERS, fields: info.inputs.clone() });
            out.push(DetailBlock::Table { title: OUTPUT_PARAMETERS, fields: info.outputs.clone() });
            out.push(DetailBlock::Table { title: MANIFEST, fields: info.resource.clone() });
        }
        NodeType::Dag | NodeType::Unknown => {}
    }
    if !info.condition.is_empty() {
        out.push(DetailBlock::Title(CONDITION));
        out.push(DetailBlock::Text(format!("{} {}", RUN_WHEN, info.condition)));
    }
    out
}

/// Pretty JSON for values that parse as an object or array.
pub fn pretty_json_value(value: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(value).ok()?;
    if v.is_object() || v.is_array() {
        serde_json::to_string_pretty(&v).ok()
    } else {
        None
    }
}

/// Plain-text rendering of the blocks (used by the CLI).
pub fn render_text(blocks: &[DetailBlock]) -> String {
    let mut out = String::new();
    for b in blocks {
        match b {
            DetailBlock::Table { title, fields } => {
                out.push_str(title);
                out.push('\n');
                for KeyValue(k, v) in fields {
                    if k.is_empty() && v.is_empty() {
                        continue;
                    }
                    match pretty_json_value(v) {
                        Some(pretty) => {
                            out.push_str(&format!("  {}:\n", k));
                            for line in pretty.lines() {
                                out.push_str("    ");
                                out.push_str(line);
                                out.push('\n');
                            }
                        }
                        None => out.push_str(&format!("  {}: {}\n", k, v)),
                    }
                }
            }
            DetailBlock::Header(h) | DetailBlock::Title(h) => {
                out.push_str(h);
                out.push('\n');
            }
            DetailBlock::Mono(s) => {
                out.push_str("  ");
                out.push_str(s);
                out.push('\n');
            }
            DetailBlock::Text(s) => {
                out.push_str(s);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(blocks: &[DetailBlock]) -> Vec<&'static str> {
        blocks
            .iter()
            .filter_map(|b| match b {
                DetailBlock::Table { title, .. } => Some(*title),
                DetailBlock::Header(h) | DetailBlock::Title(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    fn container() -> SelectedNodeInfo {
        SelectedNodeInfo {
            node_type: NodeType::Container,
            args: vec!["--epochs".into(), "10".into()],
            command: vec!["python".into(), "train.py".into()],
            image: "gcr.io/ml/train:1".into(),
            inputs: vec![KeyValue::new("lr", "0.1")],
            outputs: vec![KeyValue::new("model", "gs://b/m")],
            volume_mounts: vec![KeyValue::new("data", "/mnt/data")],
            ..Default::default()
        }
    }

    #[test]
    fn container_renders_all_sections_in_order() {
        let blocks = node_detail_blocks(&container());
        assert_eq!(
            titles(&blocks),
            vec![INPUT_PARAMETERS, OUTPUT_PARAMETERS, ARGUMENTS, COMMAND, IMAGE, VOLUME_MOUNTS]
        );
        let mono: Vec<_> = blocks
            .iter()
            .filter_map(|b| if let DetailBlock::Mono(s) = b { Some(s.as_str()) } else { None })
            .collect();
        assert_eq!(mono, vec!["--epochs", "10", "python", "train.py", "gcr.io/ml/train:1"]);
    }

    #[test]
    fn resource_renders_manifest() {
        let info = SelectedNodeInfo {
            node_type: NodeType::Resource,
            resource: vec![KeyValue::new("action", "create")],
            ..Default::default()
        };
        assert_eq!(titles(&node_detail_blocks(&info)), vec![INPUT_PARAMETERS, OUTPUT_PARAMETERS, MANIFEST]);
    }

    #[test]
    fn dag_and_unknown_render_only_condition() {
        for node_type in [NodeType::Dag, NodeType::Unknown] {
            let mut info = container();
            info.node_type = node_type;
            assert!(node_detail_blocks(&info).is_empty());
            info.condition = "{{inputs.parameters.flip}} == heads".into();
            let blocks = node_detail_blocks(&info);
            assert_eq!(
                blocks,
                vec![
                    DetailBlock::Title(CONDITION),
                    DetailBlock::Text("Run when: {{inputs.parameters.flip}} == heads".into()),
                ]
            );
        }
    }

    #[test]
    fn condition_follows_kind_blocks() {
        let mut info = container();
        info.condition = "x > 1".into();
        let blocks = node_detail_blocks(&info);
        assert_eq!(blocks.last(), Some(&DetailBlock::Text("Run when: x > 1".into())));
    }

    #[test]
    fn decodes_upstream_json_shape() {
        let text = r#"{
            "nodeType": "container",
            "args": ["a"],
            "command": [],
            "condition": "",
            "image": "img",
            "inputs": [[]],
            "outputs": [["out", "v"]],
            "volumeMounts": [["vol", "/p"]],
            "resource": [[]]
        }"#;
        let info = SelectedNodeInfo::from_json(text).expect("decode");
        assert_eq!(info.node_type, NodeType::Container);
        assert_eq!(info.inputs, vec![KeyValue::default()]);
        assert_eq!(info.outputs, vec![KeyValue::new("out", "v")]);
        assert_eq!(info.volume_mounts, vec![KeyValue::new("vol", "/p")]);
    }

    #[test]
    fn unknown_node_type_string_decodes_as_unknown() {
        let info = SelectedNodeInfo::from_json(r#"{"nodeType": "steps"}"#).expect("decode");
        assert_eq!(info.node_type, NodeType::Unknown);
    }

    #[test]
    fn text_rendering_pretty_prints_json_values() {
        let blocks = vec![DetailBlock::Table {
            title: MANIFEST,
            fields: vec![KeyValue::new("spec", r#"{"a":1}"#), KeyValue::default()],
        }];
        let text = render_text(&blocks);
        assert_eq!(text, "Manifest\n  spec:\n    {\n      \"a\": 1\n    }\n");
    }
}
