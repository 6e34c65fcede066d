// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Partial update payloads. Absent fields are left untouched by the CF API.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildState {
    Staging,
    Staged,
    Failed,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ImageDigest {
    pub digest: String,
}

/// Body of `PATCH /v3/builds/:guid`
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BuildUpdate {
    pub state: BuildState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDigest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildUpdate {
    pub fn staging() -> Self {
        Self {
            state: BuildState::Staging,
            image: None,
            error: None,
        }
    }

    pub fn staged(digest: impl Into<String>) -> Self {
        Self {
            state: BuildState::Staged,
            image: Some(ImageDigest {
                digest: digest.into(),
            }),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: BuildState::Failed,
            image: None,
            error: Some(reason.into()),
        }
    }
}

/// Body of `PATCH /v3/droplets/:guid`
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DropletUpdate {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_types: Option<BTreeMap<String, String>>,
}

/// Digest part of a `repo@sha256:...` reference
pub fn digest_from_reference(reference: &str) -> Option<&str> {
    reference
        .rsplit_once('@')
        .map(|(_, digest)| digest)
        .filter(|digest| !digest.is_empty())
}
