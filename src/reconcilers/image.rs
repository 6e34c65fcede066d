// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Image reconciler - watches kpack Images and points CF droplets at their latest image.

use crate::error::{ControllerError, Result};
use crate::reconcilers::resource_key;
use crate::sync::{sync_image, SyncContext, SyncMode};
use crate::types::Image;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ImageReconciler {
    sync: Arc<SyncContext>,
}

impl ImageReconciler {
    pub fn new(sync: Arc<SyncContext>) -> Self {
        Self { sync }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let images: Api<Image> =
            Api::namespaced(self.sync.client.clone(), &self.sync.workloads_namespace);
        let context = Arc::new(self);

        Controller::new(images, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled image: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

pub async fn reconcile(image: Arc<Image>, ctx: Arc<ImageReconciler>) -> Result<Action> {
    let key = resource_key(image.as_ref());
    let outcome = sync_image(&ctx.sync, &image, SyncMode::Event).await?;
    ctx.sync.image_retries.reset(&key);
    debug!("Image {} reconciled: {:?}", key, outcome);

    Ok(Action::await_change())
}

pub fn error_policy(image: Arc<Image>, error: &ControllerError, ctx: Arc<ImageReconciler>) -> Action {
    ctx.sync.image_retries.requeue(&resource_key(image.as_ref()), error)
}
