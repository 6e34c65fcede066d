// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{
    KPACK_GROUP, KPACK_VERSION, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS, REQUIRED_KINDS,
};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait until kpack serves every kind the reconcilers watch.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_kpack_crds(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match missing_kpack_kinds(client).await {
            Ok(missing) if missing.is_empty() => {
                info!("kpack CRDs ({}/{}) are available", KPACK_GROUP, KPACK_VERSION);
                return Ok(());
            }
            Ok(missing) => {
                info!(
                    "kpack kinds {:?} ({}/{}) not yet available, waiting {} seconds...",
                    missing, KPACK_GROUP, KPACK_VERSION, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for kpack CRDs: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Required kinds not served by the kpack API group
async fn missing_kpack_kinds(client: &Client) -> Result<Vec<&'static str>> {
    let discovery = Discovery::new(client.clone())
        .filter(&[KPACK_GROUP])
        .run()
        .await?;

    let served: Vec<String> = discovery
        .groups()
        .filter(|group| group.name() == KPACK_GROUP)
        .flat_map(|group| group.versioned_resources(KPACK_VERSION))
        .map(|(ar, _)| ar.kind)
        .collect();

    Ok(missing_kinds(&served))
}

fn missing_kinds(served: &[String]) -> Vec<&'static str> {
    REQUIRED_KINDS
        .iter()
        .copied()
        .filter(|kind| !served.iter().any(|s| s == kind))
        .collect()
}
