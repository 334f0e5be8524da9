#![forbid(unsafe_code)]

pub const PIPELINE_ID_PARAM: &str = "pid";
pub const PIPELINE_VERSION_ID_PARAM: &str = "vid";
pub const NAMESPACE_PARAM: &str = "ns";
pub const POD_PARAM: &str = "pod";

/// Route templates; `:<param>` placeholders are filled by [`fill`].
pub const PIPELINES: &str = "/pipelines";
pub const PIPELINE_DETAILS: &str = "/pipelines/details/:pid/version/:vid";
pub const RUN_NODE: &str = "/runs/node/:ns/:pod";

/// Replace `:<param>` in `template` with `value`.
pub fn fill(template: &str, param: &str, value: &str) -> String {
    template.replace(&format!(":{}", param), value)
}

/// Path of the version details page linked from the version list.
/// Without a pipeline id only the version id is filled in.
pub fn version_details_path(pipeline_id: Option<&str>, version_id: &str) -> String {
    match pipeline_id {
        Some(pid) => fill(&fill(PIPELINE_DETAILS, PIPELINE_ID_PARAM, pid), PIPELINE_VERSION_ID_PARAM, version_id),
        None => fill(PIPELINE_DETAILS, PIPELINE_VERSION_ID_PARAM, version_id),
    }
}

/// Path of the run node page for a pod.
pub fn run_node_path(namespace: &str, pod: &str) -> String {
    fill(&fill(RUN_NODE, NAMESPACE_PARAM, namespace), POD_PARAM, pod)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_with_pipeline_id() {
        assert_eq!(version_details_path(Some("p1"), "v9"), "/pipelines/details/p1/version/v9");
    }

    #[test]
    fn link_without_pipeline_id_fills_version_only() {
        assert_eq!(version_details_path(None, "v9"), "/pipelines/details/:pid/version/v9");
    }

    #[test]
    fn run_node_path_fills_namespace_and_pod() {
        assert_eq!(run_node_path("kubeflow", "train-abc"), "/runs/node/kubeflow/train-abc");
    }
}
