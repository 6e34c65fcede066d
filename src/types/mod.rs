// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! kpack custom resources observed by the controllers.

pub mod build;
pub mod image;

pub use build::{Build, BuildPhase};
pub use image::Image;

use serde::{Deserialize, Serialize};

/// A knative-style status condition as written by kpack
#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

pub(crate) fn find_condition<'a>(
    conditions: Option<&'a Vec<Condition>>,
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions?
        .iter()
        .find(|c| c.condition_type == condition_type)
}
