use std::str::FromStr;
use std::sync::Arc;

use pipeview_api::{error_to_message, ApiConfig, LiveApi};
use pipeview_gui::AppConfig;

fn init_tracing() {
    let env = std::env::var("PIPEVIEW_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn init_metrics() {
    let Ok(addr) = std::env::var("PIPEVIEW_METRICS_ADDR") else { return };
    match addr.parse::<std::net::SocketAddr>() {
        Ok(sock) => match metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(sock).install() {
            Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
            Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
        },
        Err(_) => tracing::warn!(addr = %addr, "invalid PIPEVIEW_METRICS_ADDR; expected host:port"),
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    init_tracing();
    init_metrics();
    let api_config = ApiConfig::from_env();
    tracing::info!(base_url = %api_config.base_url, "api configured");
    let api = match LiveApi::new(api_config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("api error: {}", error_to_message(&e));
            std::process::exit(1);
        }
    };
    if let Err(e) = pipeview_gui::run_native(api, AppConfig::from_env()) {
        eprintln!("GUI error: {}", e);
        std::process::exit(1);
    }
}
