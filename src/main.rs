// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cf_api_controllers::cf::{build_http_client, CfClient, RestClient, UaaClient};
use cf_api_controllers::config::Config;
use cf_api_controllers::kubernetes::{verify_namespace_exists, wait_for_kpack_crds};
use cf_api_controllers::reconcilers::{BuildReconciler, ImageReconciler, PeriodicSyncReconciler};
use cf_api_controllers::sync::SyncContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting CF API controllers");

    // Load configuration; a missing variable ends the process with exit code 1
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: cf_api_host={}, workloads_namespace={}, periodic_sync_interval={:?}",
        config.cf_api_host, config.workloads_namespace, config.periodic_sync_interval
    );
    if config.skip_tls_verify {
        warn!("TLS verification of the CF API and UAA is disabled");
    }

    let http = build_http_client(config.skip_tls_verify, config.request_timeout)?;
    let uaa_client = UaaClient::new(
        http.clone(),
        &config.uaa_endpoint,
        &config.uaa_client_name,
        &config.uaa_client_secret,
    )?;
    let cf_client = CfClient::new(
        &config.cf_api_host,
        Arc::new(RestClient::new(http)),
        Arc::new(uaa_client),
    )?;

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    verify_namespace_exists(&client, &config.workloads_namespace).await?;

    info!("Waiting for kpack CRDs to become available...");
    wait_for_kpack_crds(&client).await?;

    let sync = Arc::new(SyncContext::new(client, cf_client, &config));
    let build_reconciler = BuildReconciler::new(sync.clone());
    let image_reconciler = ImageReconciler::new(sync.clone());
    let periodic = PeriodicSyncReconciler::new(sync, config.periodic_sync_interval);

    info!("Starting reconcilers...");

    // The sweep has no shutdown hook of its own; it is aborted once the controllers stop
    let sweep = tokio::spawn(periodic.run());
    let result = tokio::try_join!(build_reconciler.run(), image_reconciler.run());
    sweep.abort();
    result?;

    info!("Controllers shut down");
    Ok(())
}
