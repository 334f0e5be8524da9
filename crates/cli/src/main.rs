use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use metrics::counter;
use pipeview_api::{error_to_message, ApiConfig, ApiError, LiveApi, ListPipelineVersionsResponse, PipelineApi, ResourceType};
use pipeview_core::columns::{pipeline_version_columns, pipeline_version_rows, ColumnKind};
use pipeview_core::format::inline_description;
use pipeview_core::node_details::{node_detail_blocks, render_text, SelectedNodeInfo};
use pipeview_core::pod::{pod_events_yaml, pod_info_yaml};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "pipeviewctl", version, about = "Pipeview CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Kubernetes namespace of the pod
    #[arg(long = "ns", global = true, default_value = "default")]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a pod as YAML, `spec` last
    PodInfo {
        name: String,
    },
    /// Print the events of a pod as YAML
    PodEvents {
        name: String,
    },
    /// List one page of versions of a pipeline
    Versions {
        pipeline_id: String,
        #[arg(long = "page-size", env = "PIPEVIEW_PAGE_SIZE")]
        page_size: Option<u32>,
        /// Token returned by the previous page
        #[arg(long = "page-token")]
        page_token: Option<String>,
        /// Sort key, e.g. "name" or "created_at"
        #[arg(long = "sort-by")]
        sort_by: Option<String>,
        /// Sort descending
        #[arg(long = "desc", action = ArgAction::SetTrue)]
        desc: bool,
    },
    /// Render static node details from a JSON file
    Node {
        file: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::PodInfo { .. } => "pod-info",
            Commands::PodEvents { .. } => "pod-events",
            Commands::Versions { .. } => "versions",
            Commands::Node { .. } => "node",
        }
    }
}

fn init_tracing() {
    let env = std::env::var("PIPEVIEW_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // stdout carries command output
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("PIPEVIEW_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid PIPEVIEW_METRICS_ADDR; expected host:port");
        }
    }
}

fn api_err(e: ApiError) -> anyhow::Error {
    anyhow!(error_to_message(&e))
}

/// `sort_by` query value: the key, with " desc" appended when descending.
fn sort_by_param(key: Option<&str>, desc: bool) -> Option<String> {
    let key = key.map(str::trim).filter(|k| !k.is_empty())?;
    Some(if desc { format!("{} desc", key) } else { key.to_string() })
}

async fn pod_info(api: &dyn PipelineApi, name: &str, ns: &str, output: Output) -> Result<String> {
    let pod = api.get_pod_info(name, ns).await.map_err(api_err)?;
    match output {
        Output::Human => Ok(pod_info_yaml(&pod)?),
        Output::Json => Ok(serde_json::to_string_pretty(&pod)?),
    }
}

async fn pod_events(api: &dyn PipelineApi, name: &str, ns: &str, output: Output) -> Result<String> {
    let events = api.get_pod_events(name, ns).await.map_err(api_err)?;
    match output {
        Output::Human => Ok(pod_events_yaml(&events)?),
        Output::Json => Ok(serde_json::to_string_pretty(&events)?),
    }
}

/// Plain table of one page, padded per column, with the next token last.
fn versions_table(resp: &ListPipelineVersionsResponse) -> String {
    let columns = pipeline_version_columns();
    let rows = pipeline_version_rows(resp.versions.as_deref().unwrap_or_default());
    let mut cells: Vec<Vec<String>> = vec![columns.iter().map(|c| c.label.to_string()).collect()];
    for row in &rows {
        cells.push(
            columns
                .iter()
                .zip(&row.fields)
                .map(|(c, v)| match c.kind {
                    ColumnKind::Description => inline_description(v),
                    _ => v.clone(),
                })
                .collect(),
        );
    }
    let widths: Vec<usize> = (0..columns.len())
        .map(|i| cells.iter().map(|r| r.get(i).map(|s| s.chars().count()).unwrap_or(0)).max().unwrap_or(0))
        .collect();
    let mut out = String::new();
    for r in &cells {
        let line: Vec<String> = r.iter().zip(&widths).map(|(s, w)| format!("{:<w$}", s, w = *w)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("No pipeline versions found.\n");
    }
    if let Some(token) = resp.next_page_token.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("next page token: {}\n", token));
    }
    out
}

async fn versions(
    api: &dyn PipelineApi,
    pipeline_id: &str,
    page_size: Option<u32>,
    page_token: Option<&str>,
    sort_by: Option<&str>,
    output: Output,
) -> Result<String> {
    let resp = api
        .list_pipeline_versions(ResourceType::Pipeline, pipeline_id, page_size, page_token, sort_by)
        .await
        .map_err(api_err)?;
    match output {
        Output::Human => Ok(versions_table(&resp)),
        Output::Json => Ok(serde_json::to_string_pretty(&resp)?),
    }
}

fn node(path: &Path, output: Output) -> Result<String> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let info = SelectedNodeInfo::from_json(&text).with_context(|| format!("invalid node info in {}", path.display()))?;
    match output {
        Output::Human => Ok(render_text(&node_detail_blocks(&info))),
        Output::Json => Ok(serde_json::to_string_pretty(&info)?),
    }
}

async fn run(cli: Cli) -> Result<String> {
    let ns = cli.namespace.trim();
    if let Commands::Node { file } = &cli.command {
        return node(file, cli.output);
    }
    let api = LiveApi::new(ApiConfig::from_env()).map_err(api_err)?;
    match &cli.command {
        Commands::PodInfo { name } => pod_info(&api, name, ns, cli.output).await,
        Commands::PodEvents { name } => pod_events(&api, name, ns, cli.output).await,
        Commands::Versions { pipeline_id, page_size, page_token, sort_by, desc } => {
            let sort = sort_by_param(sort_by.as_deref(), *desc);
            let size = page_size.or(Some(api.config().page_size));
            versions(&api, pipeline_id, size, page_token.as_deref(), sort.as_deref(), cli.output).await
        }
        Commands::Node { .. } => Err(anyhow!("unreachable node command")),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let cmd = cli.command.name();
    info!(cmd, "command invoked");
    match run(cli).await {
        Ok(out) => {
            counter!("cli_commands_total", 1, "cmd" => cmd, "ok" => "true");
            print!("{}", out);
            if !out.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            counter!("cli_commands_total", 1, "cmd" => cmd, "ok" => "false");
            error!(cmd, error = %e, "command failed");
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeview_api::{MockApi, MockCall, PipelineVersion};
    use serde_json::json;

    #[test]
    fn sort_param_appends_desc() {
        assert_eq!(sort_by_param(Some("name"), false).as_deref(), Some("name"));
        assert_eq!(sort_by_param(Some("created_at"), true).as_deref(), Some("created_at desc"));
        assert_eq!(sort_by_param(None, true), None);
        assert_eq!(sort_by_param(Some("  "), true), None);
    }

    #[test]
    fn cli_parses_versions_flags() {
        let cli = Cli::try_parse_from([
            "pipeviewctl", "-o", "json", "versions", "p1", "--page-size", "5", "--page-token", "t2", "--sort-by", "name", "--desc",
        ])
        .unwrap();
        assert_eq!(cli.output, Output::Json);
        match cli.command {
            Commands::Versions { pipeline_id, page_size, page_token, sort_by, desc } => {
                assert_eq!(pipeline_id, "p1");
                assert_eq!(page_size, Some(5));
                assert_eq!(page_token.as_deref(), Some("t2"));
                assert_eq!(sort_by.as_deref(), Some("name"));
                assert!(desc);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_namespace_defaults() {
        let cli = Cli::try_parse_from(["pipeviewctl", "pod-info", "p"]).unwrap();
        assert_eq!(cli.namespace, "default");
        let cli = Cli::try_parse_from(["pipeviewctl", "pod-events", "p", "--ns", "kubeflow"]).unwrap();
        assert_eq!(cli.namespace, "kubeflow");
    }

    #[tokio::test]
    async fn pod_info_prints_spec_last() {
        let api = MockApi::new();
        api.set_pod_info(Ok(json!({"spec": {"a": 1}, "kind": "Pod", "metadata": {"name": "p"}})));
        let out = pod_info(&api, "p", "ns", Output::Human).await.unwrap();
        let kind = out.find("kind:").unwrap();
        let spec = out.find("spec:").unwrap();
        assert!(kind < spec);
        assert_eq!(api.calls(), vec![MockCall::PodInfo { name: "p".into(), namespace: "ns".into() }]);
    }

    #[tokio::test]
    async fn pod_events_error_uses_resolved_text() {
        let api = MockApi::new();
        api.set_pod_events(Err(ApiError::Http { status: 403, body: r#"{"message":"forbidden"}"#.into() }));
        let err = pod_events(&api, "p", "ns", Output::Human).await.unwrap_err();
        assert_eq!(err.to_string(), "forbidden");
    }

    #[tokio::test]
    async fn versions_passes_paging_through() {
        let api = MockApi::new();
        api.set_versions(Ok(ListPipelineVersionsResponse {
            versions: Some(vec![PipelineVersion {
                id: Some("v1".into()),
                name: Some("first".into()),
                description: Some("line one\nline two".into()),
                ..Default::default()
            }]),
            next_page_token: Some("next".into()),
            total_size: Some(1),
        }));
        let out = versions(&api, "p1", Some(5), Some("t"), Some("name desc"), Output::Human).await.unwrap();
        assert!(out.starts_with("Version name"));
        assert!(out.contains("line one line two"));
        assert!(out.contains("next page token: next"));
        assert_eq!(
            api.calls(),
            vec![MockCall::ListVersions {
                resource_type: ResourceType::Pipeline,
                pipeline_id: "p1".into(),
                page_size: Some(5),
                page_token: Some("t".into()),
                sort_by: Some("name desc".into()),
            }]
        );
    }

    #[test]
    fn empty_page_says_so() {
        let out = versions_table(&ListPipelineVersionsResponse::default());
        assert!(out.contains("No pipeline versions found."));
        assert!(!out.contains("next page token"));
    }

    #[test]
    fn node_file_renders_blocks() {
        let dir = std::env::temp_dir().join(format!("pipeviewctl-node-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("node.json");
        std::fs::write(&path, r#"{"nodeType":"container","image":"busybox","condition":"x == 1"}"#).unwrap();
        let out = node(&path, Output::Human).unwrap();
        assert!(out.contains("busybox"));
        assert!(out.contains("Run when: x == 1"));
        assert!(node(&dir.join("missing.json"), Output::Human).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
