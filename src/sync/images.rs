// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! kpack Image latest image -> CF droplet

use crate::cf::DropletUpdate;
use crate::constants::labels;
use crate::error::Result;
use crate::sync::{SkipReason, SyncContext, SyncMode, SyncOutcome};
use crate::types::{Build, BuildPhase, Image};
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::{api::ListParams, Api, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

#[instrument(
    skip(ctx, image),
    fields(image = %format!("{}/{}", image.namespace().unwrap_or_default(), image.name_any()))
)]
pub async fn sync_image(ctx: &SyncContext, image: &Image, mode: SyncMode) -> Result<SyncOutcome> {
    let namespace = image.namespace().unwrap_or_default();
    if namespace != ctx.workloads_namespace {
        debug!("Image is outside the workloads namespace, ignoring");
        return Ok(SyncOutcome::Skipped(SkipReason::OutsideWorkloadsNamespace));
    }
    let key = format!("{}/{}", namespace, image.name_any());

    let Some(app_guid) = image.app_guid() else {
        debug!("Image has no {} label, ignoring", labels::APP_GUID);
        return Ok(SyncOutcome::Skipped(SkipReason::MissingLabel(labels::APP_GUID)));
    };

    let (Some(latest_image), Some(build_name)) = (image.latest_image(), image.latest_build_ref())
    else {
        debug!("Image has no successful build yet");
        return Ok(SyncOutcome::Skipped(SkipReason::NoLatestImage));
    };

    if !app_exists(ctx, app_guid).await? {
        debug!("App {} not found in {}, skipping", app_guid, ctx.workloads_namespace);
        return Ok(SyncOutcome::Skipped(SkipReason::NotFound {
            kind: "App",
            name: app_guid.to_string(),
        }));
    }

    let builds: Api<Build> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(build) = builds.get_opt(build_name).await? else {
        debug!("Latest build {} not found, skipping", build_name);
        return Ok(SyncOutcome::Skipped(SkipReason::NotFound {
            kind: "Build",
            name: build_name.to_string(),
        }));
    };

    // latestBuildRef follows the newest build, latestImage only the newest successful one
    match build.phase() {
        BuildPhase::Succeeded { image: Some(built) } if built == latest_image => {}
        BuildPhase::Succeeded { .. } => {
            debug!("Build {} did not produce {}, skipping", build_name, latest_image);
            return Ok(SyncOutcome::Skipped(SkipReason::LatestImageMismatch {
                name: build_name.to_string(),
            }));
        }
        phase => {
            debug!("Latest build {} is {:?}, skipping", build_name, phase);
            return Ok(SyncOutcome::Skipped(SkipReason::LatestBuildNotSucceeded {
                name: build_name.to_string(),
            }));
        }
    }

    // Droplets staged by kpack share the GUID of the build that produced them
    let Some(droplet_guid) = build.build_guid() else {
        debug!("Build {} has no {} label, ignoring", build_name, labels::BUILD_GUID);
        return Ok(SyncOutcome::Skipped(SkipReason::MissingLabel(labels::BUILD_GUID)));
    };

    let update = DropletUpdate {
        image: latest_image.to_string(),
        process_types: process_types(&build),
    };
    let applied = (droplet_guid.to_string(), update);

    if mode == SyncMode::Event && ctx.applied_images.is_applied(&key, &applied) {
        debug!("Droplet {} already points at {}", droplet_guid, latest_image);
        return Ok(SyncOutcome::Unchanged);
    }

    ctx.cf_client.update_droplet(droplet_guid, &applied.1).await?;
    info!("Updated CF droplet {} of app {} to {}", droplet_guid, app_guid, latest_image);
    ctx.applied_images.record(&key, applied);

    Ok(SyncOutcome::Applied)
}

/// Whether the app still has a workload in the workloads namespace
async fn app_exists(ctx: &SyncContext, app_guid: &str) -> Result<bool> {
    let statefulsets: Api<StatefulSet> =
        Api::namespaced(ctx.client.clone(), &ctx.workloads_namespace);
    let lp = ListParams::default()
        .labels(&format!("{}={}", labels::APP_GUID, app_guid))
        .limit(1);

    Ok(!statefulsets.list(&lp).await?.items.is_empty())
}

fn process_types(build: &Build) -> Option<BTreeMap<String, String>> {
    let raw = build.process_types_annotation()?;
    match serde_json::from_str(raw) {
        Ok(types) => Some(types),
        Err(e) => {
            warn!(
                "Ignoring malformed {} annotation on build {}: {}",
                labels::PROCESS_TYPES,
                build.name_any(),
                e
            );
            None
        }
    }
}
