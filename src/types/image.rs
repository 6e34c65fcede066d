// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::labels;
use crate::types::Condition;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kpack.io", version = "v1alpha1", kind = "Image")]
#[kube(namespaced)]
#[kube(status = "ImageStatus")]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    #[serde(default)]
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<ImageBuilderRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageBuilderRef {
    pub kind: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
    /// Name of the most recent Build of this Image, in the Image's namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_build_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_build_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_counter: Option<i64>,
}

impl Image {
    pub fn app_guid(&self) -> Option<&str> {
        self.labels().get(labels::APP_GUID).map(|s| s.as_str())
    }

    pub fn latest_image(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.latest_image.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn latest_build_ref(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.latest_build_ref.as_deref())
            .filter(|s| !s.is_empty())
    }
}
