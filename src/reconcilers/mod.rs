// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcilers: two watch-driven controllers and a time-driven sweep.

pub mod build;
pub mod image;
pub mod periodic;
pub mod retry;

pub use build::BuildReconciler;
pub use image::ImageReconciler;
pub use periodic::{PeriodicSyncReconciler, SweepReport};

use kube::ResourceExt;

/// `namespace/name` of a namespaced object
pub(crate) fn resource_key<K: ResourceExt>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}
