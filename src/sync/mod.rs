// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mapping of kpack resource status onto CF API updates, shared by the
//! event-driven reconcilers and the periodic sweep.

pub mod builds;
pub mod images;
pub mod tracker;

pub use builds::{desired_build_update, sync_build};
pub use images::sync_image;
pub use tracker::AppliedStatus;

use crate::cf::{BuildUpdate, CfClient, DropletUpdate};
use crate::config::Config;
use crate::reconcilers::retry::RetryTracker;
use kube::Client;

/// Everything a sync needs; shared by all reconcilers
pub struct SyncContext {
    pub client: Client,
    pub cf_client: CfClient,
    pub workloads_namespace: String,
    pub report_build_started: bool,
    /// Last update applied per CF build GUID
    pub applied_builds: AppliedStatus<BuildUpdate>,
    /// Last (droplet GUID, update) applied per Image key
    pub applied_images: AppliedStatus<(String, DropletUpdate)>,
    /// Consecutive reconcile failures per Build key
    pub build_retries: RetryTracker,
    /// Consecutive reconcile failures per Image key
    pub image_retries: RetryTracker,
}

impl SyncContext {
    pub fn new(client: Client, cf_client: CfClient, config: &Config) -> Self {
        Self {
            client,
            cf_client,
            workloads_namespace: config.workloads_namespace.clone(),
            report_build_started: config.report_build_started,
            applied_builds: AppliedStatus::new(),
            applied_images: AppliedStatus::new(),
            build_retries: RetryTracker::new(),
            image_retries: RetryTracker::new(),
        }
    }
}

/// Who triggered a sync
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Watch event: skip updates identical to the last applied one
    Event,
    /// Periodic sweep: always re-send, to heal drift on the CF side
    Sweep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The CF API accepted an update
    Applied,
    /// The same update was already applied
    Unchanged,
    Skipped(SkipReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Build has not finished and started-reporting is disabled
    NothingToReport,
    OutsideWorkloadsNamespace,
    MissingLabel(&'static str),
    /// Image has no successful build yet
    NoLatestImage,
    /// The Image's most recent build failed or is still in progress
    LatestBuildNotSucceeded { name: String },
    /// The most recent build produced a different image than the Image reports
    LatestImageMismatch { name: String },
    /// A referenced cluster object is gone, usually deleted concurrently
    NotFound { kind: &'static str, name: String },
}

#[cfg(test)]
pub(crate) fn test_context(client: Client, cf_client: CfClient, report_build_started: bool) -> SyncContext {
    SyncContext {
        client,
        cf_client,
        workloads_namespace: crate::test_utils::NAMESPACE.to_string(),
        report_build_started,
        applied_builds: AppliedStatus::new(),
        applied_images: AppliedStatus::new(),
        build_retries: RetryTracker::new(),
        image_retries: RetryTracker::new(),
    }
}
