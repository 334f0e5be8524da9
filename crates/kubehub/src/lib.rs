//! Pipeview kubehub: kube client wiring and pod lookups.

#![forbid(unsafe_code)]

use std::time::Instant;

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::{
    api::{Api, ListParams},
    config::KubeConfigOptions,
    Client, Config,
};
use once_cell::sync::Lazy;
use tokio::sync::Mutex;
use tracing::{debug, info};

static CLIENT: Lazy<Mutex<Option<Client>>> = Lazy::new(|| Mutex::new(None));

/// Kubeconfig context override (`PIPEVIEW_KUBE_CONTEXT`), if any.
pub fn current_context() -> Option<String> {
    std::env::var("PIPEVIEW_KUBE_CONTEXT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shared kube client, built once per process.
pub async fn get_kube_client() -> Result<Client> {
    let mut guard = CLIENT.lock().await;
    if let Some(c) = guard.as_ref() {
        return Ok(c.clone());
    }
    let t0 = Instant::now();
    let client = match current_context() {
        Some(ctx) => {
            let opts = KubeConfigOptions { context: Some(ctx.clone()), ..Default::default() };
            let cfg = Config::from_kubeconfig(&opts)
                .await
                .with_context(|| format!("loading kubeconfig context {}", ctx))?;
            Client::try_from(cfg).context("building kube client")?
        }
        None => Client::try_default().await.context("building default kube client")?,
    };
    info!(context = ?current_context(), took_ms = %t0.elapsed().as_millis(), "kube client ready");
    *guard = Some(client.clone());
    Ok(client)
}

/// Field selector matching events whose involved object is the given pod.
pub fn events_field_selector(name: &str, namespace: &str) -> String {
    format!("involvedObject.namespace={},involvedObject.name={}", namespace, name)
}

/// Fetch a pod as raw JSON.
pub async fn get_pod(name: &str, namespace: &str) -> Result<serde_json::Value> {
    let client = get_kube_client().await?;
    let api: Api<Pod> = Api::namespaced(client, namespace);
    let pod = api
        .get(name)
        .await
        .with_context(|| format!("getting pod {}/{}", namespace, name))?;
    debug!(ns = %namespace, pod = %name, "pod fetched");
    serde_json::to_value(&pod).context("serializing pod")
}

/// Fetch the event list of a pod as raw JSON.
pub async fn list_pod_events(name: &str, namespace: &str) -> Result<serde_json::Value> {
    let client = get_kube_client().await?;
    let api: Api<Event> = Api::namespaced(client, namespace);
    let lp = ListParams::default().fields(&events_field_selector(name, namespace));
    let list = api
        .list(&lp)
        .await
        .with_context(|| format!("listing events for pod {}/{}", namespace, name))?;
    debug!(ns = %namespace, pod = %name, count = list.items.len(), "pod events listed");
    let items = list
        .items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .context("serializing events")?;
    Ok(serde_json::json!({
        "apiVersion": "v1",
        "kind": "EventList",
        "metadata": serde_json::to_value(&list.metadata).context("serializing list metadata")?,
        "items": items,
    }))
}
