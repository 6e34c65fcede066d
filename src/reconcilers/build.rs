// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Build reconciler - watches kpack Builds and reports their outcome to the CF API.

use crate::error::{ControllerError, Result};
use crate::reconcilers::resource_key;
use crate::sync::{sync_build, SyncContext, SyncMode};
use crate::types::Build;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct BuildReconciler {
    sync: Arc<SyncContext>,
}

impl BuildReconciler {
    pub fn new(sync: Arc<SyncContext>) -> Self {
        Self { sync }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let builds: Api<Build> =
            Api::namespaced(self.sync.client.clone(), &self.sync.workloads_namespace);
        let context = Arc::new(self);

        Controller::new(builds, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled build: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

pub async fn reconcile(build: Arc<Build>, ctx: Arc<BuildReconciler>) -> Result<Action> {
    let key = resource_key(build.as_ref());
    let outcome = sync_build(&ctx.sync, &build, SyncMode::Event).await?;
    ctx.sync.build_retries.reset(&key);
    debug!("Build {} reconciled: {:?}", key, outcome);

    // Status changes arrive as watch events; drift is healed by the periodic sweep
    Ok(Action::await_change())
}

pub fn error_policy(build: Arc<Build>, error: &ControllerError, ctx: Arc<BuildReconciler>) -> Action {
    ctx.sync.build_retries.requeue(&resource_key(build.as_ref()), error)
}
