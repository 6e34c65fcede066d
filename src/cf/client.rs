// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed CF API client. Every update fetches a token and issues exactly one PATCH;
//! retries are left to the reconcilers.

use crate::cf::auth::TokenFetcher;
use crate::cf::model::{BuildUpdate, DropletUpdate};
use crate::error::{ControllerError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Raw HTTP transport, returns the response status code
#[async_trait]
pub trait Rest: Send + Sync {
    async fn patch(&self, url: &str, token: &str, body: Vec<u8>) -> Result<u16>;
}

/// Build the HTTP client shared by the token exchange and the CF API transport
pub fn build_http_client(skip_tls_verify: bool, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(skip_tls_verify)
        .build()
        .map_err(|e| ControllerError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Rest for RestClient {
    async fn patch(&self, url: &str, token: &str, body: Vec<u8>) -> Result<u16> {
        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ControllerError::TransportError(format!("PATCH {}: {}", url, e)))?;

        Ok(response.status().as_u16())
    }
}

#[derive(Clone)]
pub struct CfClient {
    host: String,
    rest: Arc<dyn Rest>,
    tokens: Arc<dyn TokenFetcher>,
}

impl CfClient {
    pub fn new(host: &str, rest: Arc<dyn Rest>, tokens: Arc<dyn TokenFetcher>) -> Result<Self> {
        let parsed = Url::parse(host).map_err(|e| {
            ControllerError::ConfigError(format!("Invalid CF API host {}: {}", host, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ControllerError::ConfigError(format!(
                "CF API host {} must use http or https",
                host
            )));
        }

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            rest,
            tokens,
        })
    }

    pub async fn update_build(&self, build_guid: &str, update: &BuildUpdate) -> Result<()> {
        self.patch("builds", build_guid, update).await
    }

    pub async fn update_droplet(&self, droplet_guid: &str, update: &DropletUpdate) -> Result<()> {
        self.patch("droplets", droplet_guid, update).await
    }

    #[instrument(skip(self, payload))]
    async fn patch<T: Serialize + Sync>(&self, collection: &str, guid: &str, payload: &T) -> Result<()> {
        let token = self.tokens.fetch().await?;
        let raw = serde_json::to_vec(payload)?;
        let url = format!("{}/v3/{}/{}", self.host, collection, guid);

        let status = self.rest.patch(&url, &token, raw).await?;
        if status == 401 {
            self.tokens.invalidate(&token).await;
        }
        if status != 200 {
            return Err(ControllerError::RemoteApiError {
                resource: format!("{}/{}", collection, guid),
                status,
            });
        }

        debug!("Patched {}", url);
        Ok(())
    }
}
