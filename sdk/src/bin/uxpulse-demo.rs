//! UXPulse demo host
//!
//! Loads the SDK config from `UXPULSE_*` env vars, simulates a short user
//! session against the collector, then flushes and prints client stats.

use std::time::Duration;

use uxpulse::{constants, global, FetchInit, IssuesClient, SdkConfig, TrackOptions};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match SdkConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let base_url = config.collector_url().to_string();

    log::info!("Starting UXPulse demo v{} against {}", constants::SDK_VERSION, base_url);
    global::init(config);

    global::track_screen("Home", Some("src/screens/Home.tsx"));
    global::track_event(
        "add_to_cart",
        TrackOptions::new().screen("Home").prop("sku", "A-1").prop("qty", 2),
    );

    let health_url = format!("{}/health", base_url);
    match global::tracked_fetch(&health_url, FetchInit::new().screen("Home")).await {
        Ok(res) => log::info!("Collector health: {} {}", res.status, res.text()),
        Err(e) => log::warn!("Collector unreachable: {}", e),
    }

    global::track_screen("Checkout", Some("src/screens/Checkout.tsx"));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let outcome = global::shutdown().await;
    log::info!("Final flush: {:?}", outcome);

    match serde_json::to_string_pretty(&global::stats()) {
        Ok(stats) => println!("{}", stats),
        Err(e) => log::warn!("Failed to serialize stats: {}", e),
    }

    let issues = IssuesClient::from_env();
    log::info!("Listing issues from {}", issues.base_url());
    match issues.fetch_issues(constants::DEFAULT_ISSUE_LIMIT).await {
        Ok(issues) => {
            for issue in issues {
                println!("{}", issue.label());
            }
        }
        Err(e) => log::warn!("Failed to fetch issues: {}", e),
    }
}
