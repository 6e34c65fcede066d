// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic sweep that re-applies the status of every Build and Image in the
//! workloads namespace, regardless of watch events.
//!
//! Heals drift after missed or coalesced events and after restarts, when the
//! in-memory record of applied updates is gone. Racing with the watch-driven
//! reconcilers is harmless: both send idempotent PATCHes, the last one wins.

use crate::constants::SWEEP_CONCURRENCY;
use crate::error::Result;
use crate::reconcilers::resource_key;
use crate::sync::{sync_build, sync_image, SyncContext, SyncMode, SyncOutcome};
use crate::types::{Build, Image};
use futures::{stream, Future, StreamExt};
use kube::{api::ListParams, Api};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub key: String,
    pub error: String,
}

/// Result of one sweep. Per-resource failures never abort the sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failures: Vec<SweepFailure>,
    /// Resource kinds that could not be listed at all
    pub list_errors: Vec<String>,
}

impl SweepReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    fn add(&mut self, key: String, result: Result<SyncOutcome>) {
        self.attempted += 1;
        match result {
            Ok(SyncOutcome::Applied) | Ok(SyncOutcome::Unchanged) => self.applied += 1,
            Ok(SyncOutcome::Skipped(_)) => self.skipped += 1,
            Err(e) => {
                warn!("Periodic sync of {} failed: {}", key, e);
                self.failures.push(SweepFailure {
                    key,
                    error: e.to_string(),
                });
            }
        }
    }
}

pub struct PeriodicSyncReconciler {
    sync: Arc<SyncContext>,
    interval: Duration,
}

impl PeriodicSyncReconciler {
    pub fn new(sync: Arc<SyncContext>, interval: Duration) -> Self {
        Self { sync, interval }
    }

    /// Sweep immediately, then once per interval, until the task is aborted
    pub async fn run(self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.sweep().await;
            if report.failure_count() > 0 || !report.list_errors.is_empty() {
                error!(
                    "Periodic sync finished with {} failed resource(s) and {} listing error(s) out of {} attempted",
                    report.failure_count(),
                    report.list_errors.len(),
                    report.attempted
                );
            } else {
                info!(
                    "Periodic sync finished: {} synced, {} skipped",
                    report.applied, report.skipped
                );
            }
        }
    }

    #[instrument(skip(self), fields(namespace = %self.sync.workloads_namespace))]
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let lp = ListParams::default();

        let builds: Api<Build> =
            Api::namespaced(self.sync.client.clone(), &self.sync.workloads_namespace);
        match builds.list(&lp).await {
            Ok(list) => {
                let live_guids: HashSet<String> = list
                    .items
                    .iter()
                    .filter_map(|b| b.build_guid().map(str::to_string))
                    .collect();
                let live_keys: HashSet<String> = list.items.iter().map(resource_key).collect();
                let sync = Arc::clone(&self.sync);
                let results = run_bounded(list.items.into_iter().map(move |build| {
                    let sync = Arc::clone(&sync);
                    async move {
                        let result = sync_build(&sync, &build, SyncMode::Sweep).await;
                        (resource_key(&build), result)
                    }
                }))
                .await;
                for (key, result) in results {
                    report.add(key, result);
                }
                self.sync.applied_builds.retain_keys(&live_guids);
                self.sync.build_retries.retain_keys(&live_keys);
            }
            Err(e) => {
                error!("Failed to list builds: {}", e);
                report.list_errors.push(format!("builds: {}", e));
            }
        }

        let images: Api<Image> =
            Api::namespaced(self.sync.client.clone(), &self.sync.workloads_namespace);
        match images.list(&lp).await {
            Ok(list) => {
                let live_keys: HashSet<String> = list.items.iter().map(resource_key).collect();
                let sync = Arc::clone(&self.sync);
                let results = run_bounded(list.items.into_iter().map(move |image| {
                    let sync = Arc::clone(&sync);
                    async move {
                        let result = sync_image(&sync, &image, SyncMode::Sweep).await;
                        (resource_key(&image), result)
                    }
                }))
                .await;
                for (key, result) in results {
                    report.add(key, result);
                }
                self.sync.applied_images.retain_keys(&live_keys);
                self.sync.image_retries.retain_keys(&live_keys);
            }
            Err(e) => {
                error!("Failed to list images: {}", e);
                report.list_errors.push(format!("images: {}", e));
            }
        }

        report
    }
}

async fn run_bounded<I, F, T>(tasks: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    stream::iter(tasks)
        .buffer_unordered(SWEEP_CONCURRENCY)
        .collect()
        .await
}
