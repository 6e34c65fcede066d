// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! kpack Build status -> CF build state

use crate::cf::model::digest_from_reference;
use crate::cf::BuildUpdate;
use crate::constants::labels;
use crate::error::{ControllerError, Result};
use crate::sync::{SkipReason, SyncContext, SyncMode, SyncOutcome};
use crate::types::{Build, BuildPhase};
use kube::ResourceExt;
use tracing::{debug, info, instrument};

/// The update the CF build should receive for the build's current phase.
///
/// Pending builds map to nothing. Running builds map to `STAGING` only when
/// `report_build_started` is set, since the CF API creates builds in that state.
pub fn desired_build_update(build: &Build, report_build_started: bool) -> Result<Option<BuildUpdate>> {
    match build.phase() {
        BuildPhase::Pending => Ok(None),
        BuildPhase::Running => Ok(report_build_started.then(BuildUpdate::staging)),
        BuildPhase::Succeeded { image } => {
            let image = image.ok_or_else(|| {
                ControllerError::InvalidResource(format!(
                    "build {} succeeded without a latest image",
                    build.name_any()
                ))
            })?;
            let digest = digest_from_reference(&image).ok_or_else(|| {
                ControllerError::InvalidResource(format!(
                    "build {} image {} has no digest",
                    build.name_any(),
                    image
                ))
            })?;
            Ok(Some(BuildUpdate::staged(digest)))
        }
        BuildPhase::Failed { reason } => Ok(Some(BuildUpdate::failed(reason))),
    }
}

#[instrument(
    skip(ctx, build),
    fields(build = %format!("{}/{}", build.namespace().unwrap_or_default(), build.name_any()))
)]
pub async fn sync_build(ctx: &SyncContext, build: &Build, mode: SyncMode) -> Result<SyncOutcome> {
    if build.namespace().as_deref() != Some(ctx.workloads_namespace.as_str()) {
        debug!("Build is outside the workloads namespace, ignoring");
        return Ok(SyncOutcome::Skipped(SkipReason::OutsideWorkloadsNamespace));
    }

    let Some(build_guid) = build.build_guid() else {
        debug!("Build has no {} label, ignoring", labels::BUILD_GUID);
        return Ok(SyncOutcome::Skipped(SkipReason::MissingLabel(labels::BUILD_GUID)));
    };

    let Some(update) = desired_build_update(build, ctx.report_build_started)? else {
        debug!("Build {} has nothing to report yet", build_guid);
        return Ok(SyncOutcome::Skipped(SkipReason::NothingToReport));
    };

    if mode == SyncMode::Event && ctx.applied_builds.is_applied(build_guid, &update) {
        debug!("Build {} already reported as {:?}", build_guid, update.state);
        return Ok(SyncOutcome::Unchanged);
    }

    ctx.cf_client.update_build(build_guid, &update).await?;
    info!("Updated CF build {} to {:?}", build_guid, update.state);
    ctx.applied_builds.record(build_guid, update);

    Ok(SyncOutcome::Applied)
}
