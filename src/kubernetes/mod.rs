// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Startup checks against the Kubernetes API: kpack CRD discovery and namespace verification.

pub mod crd;
pub mod namespaces;

pub use crd::wait_for_kpack_crds;
pub use namespaces::verify_namespace_exists;
