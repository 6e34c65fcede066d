// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cloud Controller (CF API) access: token exchange, REST transport and typed updates.

pub mod auth;
pub mod client;
pub mod model;

pub use auth::{TokenFetcher, UaaClient};
pub use client::{build_http_client, CfClient, Rest, RestClient};
pub use model::{BuildState, BuildUpdate, DropletUpdate};
