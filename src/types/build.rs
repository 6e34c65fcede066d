// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{conditions, labels};
use crate::types::{find_condition, Condition};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kpack.io", version = "v1alpha1", kind = "Build")]
#[kube(namespaced)]
#[kube(status = "BuildStatus")]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuildBuilderSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildBuilderSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_completed: Option<Vec<String>>,
}

/// Lifecycle phase of a build, derived from its `Succeeded` condition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildPhase {
    Pending,
    Running,
    Succeeded { image: Option<String> },
    Failed { reason: String },
}

impl Build {
    pub fn phase(&self) -> BuildPhase {
        let Some(status) = self.status.as_ref() else {
            return BuildPhase::Pending;
        };

        match find_condition(status.conditions.as_ref(), conditions::SUCCEEDED) {
            None => BuildPhase::Pending,
            Some(c) if c.status == conditions::STATUS_TRUE => BuildPhase::Succeeded {
                image: status.latest_image.clone(),
            },
            Some(c) if c.status == conditions::STATUS_FALSE => BuildPhase::Failed {
                reason: c
                    .message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .or_else(|| c.reason.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            Some(_) => BuildPhase::Running,
        }
    }

    /// CF build GUID this kpack Build reports to; droplets staged by it share the GUID
    pub fn build_guid(&self) -> Option<&str> {
        self.labels().get(labels::BUILD_GUID).map(|s| s.as_str())
    }

    /// Raw process types annotation, a JSON object
    pub fn process_types_annotation(&self) -> Option<&str> {
        self.annotations()
            .get(labels::PROCESS_TYPES)
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn make_build(status: Option<BuildStatus>) -> Build {
        Build {
            metadata: ObjectMeta {
                name: Some("build-1".to_string()),
                namespace: Some("cf-workloads".to_string()),
                labels: Some(BTreeMap::from([(
                    labels::BUILD_GUID.to_string(),
                    "B1".to_string(),
                )])),
                ..Default::default()
            },
            spec: BuildSpec {
                tags: vec!["registry/app".to_string()],
                service_account: None,
                builder: None,
            },
            status,
        }
    }

    fn succeeded(status: &str, message: Option<&str>, reason: Option<&str>) -> Condition {
        Condition {
            condition_type: conditions::SUCCEEDED.to_string(),
            status: status.to_string(),
            reason: reason.map(str::to_string),
            message: message.map(str::to_string),
            last_transition_time: None,
        }
    }

    fn status_with(condition: Option<Condition>, latest_image: Option<&str>) -> BuildStatus {
        BuildStatus {
            conditions: condition.map(|c| vec![c]),
            latest_image: latest_image.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_phase_without_status_is_pending() {
        assert_eq!(make_build(None).phase(), BuildPhase::Pending);
    }

    #[test]
    fn test_phase_without_succeeded_condition_is_pending() {
        let build = make_build(Some(status_with(None, None)));
        assert_eq!(build.phase(), BuildPhase::Pending);
    }

    #[test]
    fn test_phase_unknown_is_running() {
        let build = make_build(Some(status_with(Some(succeeded("Unknown", None, None)), None)));
        assert_eq!(build.phase(), BuildPhase::Running);
    }

    #[test]
    fn test_phase_succeeded_carries_image() {
        let build = make_build(Some(status_with(
            Some(succeeded("True", None, None)),
            Some("registry/app@sha256:abc"),
        )));
        assert_eq!(
            build.phase(),
            BuildPhase::Succeeded {
                image: Some("registry/app@sha256:abc".to_string())
            }
        );
    }

    #[test]
    fn test_phase_failed_prefers_message() {
        let build = make_build(Some(status_with(
            Some(succeeded("False", Some("step build exited 1"), Some("BuildFailed"))),
            None,
        )));
        assert_eq!(
            build.phase(),
            BuildPhase::Failed {
                reason: "step build exited 1".to_string()
            }
        );
    }

    #[test]
    fn test_phase_failed_falls_back_to_reason() {
        let build = make_build(Some(status_with(
            Some(succeeded("False", Some(""), Some("BuildFailed"))),
            None,
        )));
        assert_eq!(
            build.phase(),
            BuildPhase::Failed {
                reason: "BuildFailed".to_string()
            }
        );
    }

    #[test]
    fn test_build_guid_from_label() {
        assert_eq!(make_build(None).build_guid(), Some("B1"));
    }

    #[test]
    fn test_deserialize_kpack_build() {
        let build: Build = serde_json::from_value(serde_json::json!({
            "apiVersion": "kpack.io/v1alpha1",
            "kind": "Build",
            "metadata": {"name": "build-1", "namespace": "cf-workloads"},
            "spec": {"tags": ["registry/app"], "serviceAccount": "cc-kpack-registry-service-account"},
            "status": {
                "conditions": [{"type": "Succeeded", "status": "True"}],
                "latestImage": "registry/app@sha256:abc",
                "podName": "build-1-pod"
            }
        }))
        .unwrap();

        assert_eq!(
            build.spec.service_account.as_deref(),
            Some("cc-kpack-registry-service-account")
        );
        assert!(matches!(build.phase(), BuildPhase::Succeeded { .. }));
    }
}
