// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label and annotation keys placed on kpack resources by the Cloud Controller
pub mod labels {
    /// GUID of the CF build that produced a kpack Build
    pub const BUILD_GUID: &str = "cloudfoundry.org/build_guid";
    /// GUID of the CF app an Image (or a workload StatefulSet) belongs to
    pub const APP_GUID: &str = "cloudfoundry.org/app_guid";
    /// JSON object of process type name to start command
    pub const PROCESS_TYPES: &str = "cloudfoundry.org/process_types";
}

/// kpack status condition names and values
pub mod conditions {
    pub const SUCCEEDED: &str = "Succeeded";
    pub const STATUS_TRUE: &str = "True";
    pub const STATUS_FALSE: &str = "False";
}

/// CRD polling configuration
pub mod crd {
    /// API group serving kpack Build and Image
    pub const KPACK_GROUP: &str = "kpack.io";
    pub const KPACK_VERSION: &str = "v1alpha1";
    /// Kinds that must be served before the reconcilers start
    pub const REQUIRED_KINDS: &[&str] = &["Build", "Image"];
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Requeue policy for failed reconcile attempts
pub mod retry {
    pub const BASE_DELAY_SECS: u64 = 5;
    pub const MAX_DELAY_SECS: u64 = 300;
    /// Consecutive failures for one key before the attempt is reported as exhausted
    pub const BUDGET: u32 = 10;
}

/// Seconds before expiry at which a cached UAA token is no longer handed out
pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 30;

/// Number of resources synced at once during a periodic sweep
pub const SWEEP_CONCURRENCY: usize = 4;
