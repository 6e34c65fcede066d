// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CF API, always carrying a scheme
    pub cf_api_host: String,
    pub uaa_endpoint: String,
    pub uaa_client_name: String,
    pub uaa_client_secret: String,
    /// The only namespace whose kpack resources are synced
    pub workloads_namespace: String,
    pub periodic_sync_interval: Duration,
    pub request_timeout: Duration,
    /// Only meant for development environments with self-signed certificates
    pub skip_tls_verify: bool,
    /// Send a STAGING update when a build starts running
    pub report_build_started: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} environment variable not set", key))
        };

        let cf_api_host = with_scheme(&required("CF_API_HOST")?);
        let uaa_endpoint = required("UAA_ENDPOINT")?;
        let uaa_client_name = required("CF_CLIENT_NAME")?;
        let uaa_client_secret = required("CF_CLIENT_SECRET")?;
        let workloads_namespace = required("WORKLOADS_NAMESPACE")?;

        let periodic_sync_interval =
            Duration::from_secs(parse_or(&lookup, "PERIODIC_SYNC_INTERVAL_SECS", 300)?);
        if periodic_sync_interval.is_zero() {
            return Err(anyhow!("PERIODIC_SYNC_INTERVAL_SECS must be greater than zero"));
        }
        let request_timeout = Duration::from_secs(parse_or(&lookup, "CF_API_TIMEOUT_SECS", 30)?);
        let skip_tls_verify = parse_or(&lookup, "CF_API_SKIP_TLS_VERIFY", false)?;
        let report_build_started = parse_or(&lookup, "REPORT_BUILD_STARTED", false)?;

        Ok(Config {
            cf_api_host,
            uaa_endpoint,
            uaa_client_name,
            uaa_client_secret,
            workloads_namespace,
            periodic_sync_interval,
            request_timeout,
            skip_tls_verify,
            report_build_started,
        })
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value {:?} for {}: {}", raw, key, e)),
        None => Ok(default),
    }
}
