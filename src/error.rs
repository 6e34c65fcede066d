// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Token exchange failed: {0}")]
    AuthError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Failed to patch {resource}, received status {status}")]
    RemoteApiError { resource: String, status: u16 },

    #[error("Failed to serialize payload: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

impl ControllerError {
    /// Whether requeueing the same reconcile can be expected to succeed eventually.
    pub fn is_retryable(&self) -> bool {
        match self {
            ControllerError::KubeError(_)
            | ControllerError::AuthError(_)
            | ControllerError::TransportError(_) => true,
            ControllerError::RemoteApiError { status, .. } => !is_permanent_status(*status),
            ControllerError::SerializationError(_)
            | ControllerError::ConfigError(_)
            | ControllerError::InvalidResource(_) => false,
        }
    }
}

/// Client errors that will not change on resend. 401, 408, 409 and 429 are transient.
fn is_permanent_status(status: u16) -> bool {
    let Ok(code) = StatusCode::from_u16(status) else {
        return false;
    };
    code.is_client_error()
        && !matches!(
            code,
            StatusCode::UNAUTHORIZED
                | StatusCode::REQUEST_TIMEOUT
                | StatusCode::CONFLICT
                | StatusCode::TOO_MANY_REQUESTS
        )
}

pub type Result<T> = std::result::Result<T, ControllerError>;
