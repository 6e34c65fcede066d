// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the Kubernetes API and the CF API.

use crate::cf::{CfClient, Rest, TokenFetcher};
use crate::error::{ControllerError, Result as ControllerResult};
use async_trait::async_trait;
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

pub const NAMESPACE: &str = "cf-workloads";
pub const KPACK_PREFIX: &str = "/apis/kpack.io/v1alpha1/namespaces/cf-workloads";
pub const STATEFULSETS_PATH: &str = "/apis/apps/v1/namespaces/cf-workloads/statefulsets";

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Method and path of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Longest registered prefix wins, so a list path does not shadow its items
        responses
            .iter()
            .filter(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .max_by_key(|((_, p), _)| p.len())
            .map(|(_, resp)| resp.clone())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Wrap items in a Kubernetes list response
pub fn list_json(api_version: &str, kind: &str, items: Vec<Value>) -> String {
    json!({
        "apiVersion": api_version,
        "kind": format!("{}List", kind),
        "metadata": {"resourceVersion": "1"},
        "items": items
    })
    .to_string()
}

/// A kpack Build with the given `Succeeded` condition status (`None` means no condition)
pub fn build_json(
    name: &str,
    build_guid: &str,
    succeeded: Option<&str>,
    latest_image: Option<&str>,
    message: Option<&str>,
) -> Value {
    let mut status = json!({});
    if let Some(s) = succeeded {
        status["conditions"] = json!([{"type": "Succeeded", "status": s, "message": message}]);
    }
    if let Some(image) = latest_image {
        status["latestImage"] = json!(image);
    }

    json!({
        "apiVersion": "kpack.io/v1alpha1",
        "kind": "Build",
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "uid": format!("uid-{}", name),
            "labels": {"cloudfoundry.org/build_guid": build_guid}
        },
        "spec": {"tags": ["registry/app"]},
        "status": status
    })
}

pub fn image_json(
    name: &str,
    namespace: &str,
    app_guid: &str,
    latest_image: Option<&str>,
    latest_build_ref: Option<&str>,
) -> Value {
    json!({
        "apiVersion": "kpack.io/v1alpha1",
        "kind": "Image",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
            "labels": {"cloudfoundry.org/app_guid": app_guid}
        },
        "spec": {"tag": "registry/app"},
        "status": {
            "latestImage": latest_image,
            "latestBuildRef": latest_build_ref
        }
    })
}

pub fn statefulset_json(name: &str, app_guid: &str) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "StatefulSet",
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "labels": {"cloudfoundry.org/app_guid": app_guid}
        }
    })
}

/// One PATCH received by [`FakeRest`]
#[derive(Clone, Debug)]
pub struct RecordedPatch {
    pub url: String,
    pub token: String,
    pub body: Vec<u8>,
}

impl RecordedPatch {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// In-memory CF API transport; answers 200 unless a path suffix was configured otherwise
#[derive(Clone, Default)]
pub struct FakeRest {
    calls: Arc<Mutex<Vec<RecordedPatch>>>,
    statuses: Arc<Mutex<Vec<(String, u16)>>>,
}

impl FakeRest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL ends with `suffix` with `status`
    pub fn respond(self, suffix: &str, status: u16) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push((suffix.to_string(), status));
        self
    }

    pub fn calls(&self) -> Vec<RecordedPatch> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }
}

#[async_trait]
impl Rest for FakeRest {
    async fn patch(&self, url: &str, token: &str, body: Vec<u8>) -> ControllerResult<u16> {
        self.calls.lock().unwrap().push(RecordedPatch {
            url: url.to_string(),
            token: token.to_string(),
            body,
        });
        let status = self
            .statuses
            .lock()
            .unwrap()
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .map(|(_, status)| *status)
            .unwrap_or(200);
        Ok(status)
    }
}

/// Token source handing out `token-1`, `token-2`, ... or always failing
#[derive(Clone, Default)]
pub struct FakeTokenFetcher {
    fetches: Arc<AtomicUsize>,
    invalidated: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl FakeTokenFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Tokens reported as rejected, in order
    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenFetcher for FakeTokenFetcher {
    async fn fetch(&self) -> ControllerResult<String> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(ControllerError::AuthError("credentials rejected".to_string()));
        }
        Ok(format!("token-{}", n))
    }

    async fn invalidate(&self, token: &str) {
        self.invalidated.lock().unwrap().push(token.to_string());
    }
}

pub fn fake_cf_client(rest: &FakeRest, tokens: &FakeTokenFetcher) -> CfClient {
    CfClient::new(
        "https://api.example.com",
        Arc::new(rest.clone()),
        Arc::new(tokens.clone()),
    )
    .unwrap()
}
