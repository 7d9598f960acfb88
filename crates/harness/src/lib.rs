// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authsmoke: readiness polling and smoke scenarios for an OAuth2
//! user-registration service.

pub mod client;
pub mod config;
pub mod oauth;
pub mod poll;
pub mod scenario;

use std::sync::Once;

use crate::client::ServiceClient;
use crate::config::SmokeConfig;
use crate::scenario::Scenario;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Run the full smoke scenario against the configured service.
pub async fn run(config: SmokeConfig) -> anyhow::Result<()> {
    ensure_crypto();

    let policy = config.retry_policy();
    let credentials = config.credentials();
    let client = ServiceClient::new(config.base_url.clone(), config.paths());
    let mut scenario = Scenario::new(client, credentials);

    tracing::info!(base_url = %config.base_url, "waiting for service readiness");
    scenario.wait_ready(&policy).await?;

    tracing::info!(name = %scenario.credentials().name, "registering user");
    scenario.register().await?;

    tracing::info!("confirming registration");
    scenario.confirm().await?;

    tracing::info!("logging in with password grant");
    scenario.login().await?;

    let user = scenario.verify_user().await?;
    tracing::info!(name = %user.name, email = %user.email, "fetched current user");

    tracing::info!("refreshing access token");
    scenario.refresh().await?;

    // The rotated token must also work against the protected resource.
    scenario.verify_user().await?;

    tracing::info!("smoke scenario passed");
    Ok(())
}
