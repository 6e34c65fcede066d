// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bearer token source for the CF API.
//!
//! [`UaaClient`] performs an OAuth2 client-credentials exchange against UAA and
//! hands out the cached token until it is close to expiry. Failures are returned
//! as [`ControllerError::AuthError`] without retrying; the reconcilers own retries.

use crate::constants::TOKEN_EXPIRY_SKEW_SECS;
use crate::error::{ControllerError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Return a token that is valid at the time of the call
    async fn fetch(&self) -> Result<String>;

    /// Forget `token` if it is the one being handed out, so the next fetch gets a new one
    async fn invalidate(&self, token: &str);
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct UaaClient {
    http: reqwest::Client,
    token_url: Url,
    client_name: String,
    client_secret: String,
    cache: Mutex<Option<CachedToken>>,
}

impl UaaClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        client_name: &str,
        client_secret: &str,
    ) -> Result<Self> {
        if client_name.is_empty() || client_secret.is_empty() {
            return Err(ControllerError::ConfigError(
                "UAA client name and secret must be set".to_string(),
            ));
        }
        let token_url = Url::parse(&format!("{}/oauth/token", endpoint.trim_end_matches('/')))
            .map_err(|e| {
                ControllerError::ConfigError(format!("Invalid UAA endpoint {}: {}", endpoint, e))
            })?;

        Ok(Self {
            http,
            token_url,
            client_name: client_name.to_string(),
            client_secret: client_secret.to_string(),
            cache: Mutex::new(None),
        })
    }

    #[instrument(skip(self), fields(url = %self.token_url))]
    async fn exchange(&self) -> Result<CachedToken> {
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_name, Some(&self.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_name.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ControllerError::AuthError(format!("UAA unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControllerError::AuthError(format!(
                "UAA rejected client credentials with status {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ControllerError::AuthError(format!("Failed to parse UAA token response: {}", e))
        })?;

        // Tokens without a lifetime are never reused
        let lifetime = token
            .expires_in
            .map(|secs| Duration::from_secs(secs.saturating_sub(TOKEN_EXPIRY_SKEW_SECS)))
            .unwrap_or_default();
        debug!("Obtained UAA token valid for {:?}", lifetime);

        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl TokenFetcher for UaaClient {
    async fn fetch(&self) -> Result<String> {
        // Held across the exchange so concurrent callers share one refresh
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(value)
    }

    async fn invalidate(&self, token: &str) {
        let mut cache = self.cache.lock().await;
        // A concurrent caller may already have replaced it
        if cache.as_ref().is_some_and(|cached| cached.value == token) {
            debug!("Discarding rejected UAA token");
            *cache = None;
        }
    }
}
