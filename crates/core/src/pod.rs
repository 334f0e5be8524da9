//! Pod info / pod events shaping for the YAML views.

#![forbid(unsafe_code)]

use serde_json::{Map, Value};

use crate::CoreResult;

/// Copy of `data` with the top-level `spec` key moved to the end.
///
/// Relies on `serde_json` preserving insertion order; every other key keeps
/// its relative position. Non-objects and objects without `spec` are
/// returned unchanged.
pub fn reorder_pod_json(data: &Value) -> Value {
    let Some(obj) = data.as_object() else {
        return data.clone();
    };
    if !obj.contains_key("spec") {
        return data.clone();
    }
    let mut ordered = Map::with_capacity(obj.len());
    let mut spec = None;
    for (k, v) in obj {
        if k == "spec" {
            spec = Some(v.clone());
        } else {
            ordered.insert(k.clone(), v.clone());
        }
    }
    if let Some(spec) = spec {
        ordered.insert("spec".to_string(), spec);
    }
    Value::Object(ordered)
}

/// Serialize any JSON value as block YAML.
pub fn to_yaml(value: &Value) -> CoreResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// YAML for the pod info view (`spec` printed last).
pub fn pod_info_yaml(pod: &Value) -> CoreResult<String> {
    to_yaml(&reorder_pod_json(pod))
}

/// YAML for the pod events view (no reordering).
pub fn pod_events_yaml(events: &Value) -> CoreResult<String> {
    to_yaml(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(v: &Value) -> Vec<String> {
        v.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn spec_first_moves_to_end() {
        let input = json!({"spec": 1, "a": 2, "b": 3});
        assert_eq!(keys(&reorder_pod_json(&input)), vec!["a", "b", "spec"]);
    }

    #[test]
    fn spec_in_middle_moves_to_end_keeping_others() {
        let input = json!({"kind": "Pod", "metadata": {}, "spec": {"x": 1}, "status": {"phase": "Running"}});
        let out = reorder_pod_json(&input);
        assert_eq!(keys(&out), vec!["kind", "metadata", "status", "spec"]);
        assert_eq!(out["spec"], json!({"x": 1}));
        // input untouched
        assert_eq!(keys(&input), vec!["kind", "metadata", "spec", "status"]);
    }

    #[test]
    fn without_spec_order_is_unchanged() {
        let input = json!({"z": 1, "a": 2, "m": 3});
        assert_eq!(keys(&reorder_pod_json(&input)), vec!["z", "a", "m"]);
    }

    #[test]
    fn nested_spec_is_not_moved() {
        let input = json!({"metadata": {"spec": 1, "name": "p"}, "status": {}});
        let out = reorder_pod_json(&input);
        assert_eq!(keys(&out), vec!["metadata", "status"]);
        assert_eq!(keys(&out["metadata"]), vec!["spec", "name"]);
    }

    #[test]
    fn non_object_passes_through() {
        assert_eq!(reorder_pod_json(&json!([1, 2])), json!([1, 2]));
        assert_eq!(reorder_pod_json(&Value::Null), Value::Null);
    }

    #[test]
    fn pod_yaml_prints_spec_last() {
        let pod = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "spec": {"nodeName": "n1"},
            "metadata": {"name": "p1"},
            "status": {"phase": "Running"}
        });
        let yaml = pod_info_yaml(&pod).expect("yaml");
        let spec_at = yaml.find("spec:").expect("spec");
        let status_at = yaml.find("status:").expect("status");
        let meta_at = yaml.find("metadata:").expect("metadata");
        assert!(meta_at < status_at && status_at < spec_at, "yaml was:\n{}", yaml);
        assert!(yaml.starts_with("apiVersion: v1\n"));
    }

    #[test]
    fn events_yaml_keeps_order() {
        let events = json!({"spec": "first", "items": []});
        let yaml = pod_events_yaml(&events).expect("yaml");
        assert!(yaml.find("spec:").unwrap() < yaml.find("items:").unwrap());
    }
}
