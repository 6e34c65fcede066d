// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::{ControllerError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Fail fast when the configured workloads namespace does not exist
#[instrument(skip(client))]
pub async fn verify_namespace_exists(client: &Client, namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get_opt(namespace).await? {
        Some(_) => {
            debug!("Namespace {} exists", namespace);
            Ok(())
        }
        None => Err(ControllerError::ConfigError(format!(
            "workloads namespace {} does not exist",
            namespace
        ))),
    }
}
