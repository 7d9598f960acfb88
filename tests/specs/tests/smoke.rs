// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke scenarios against the in-process stub service:
//! readiness polling, registration, confirmation, password grant,
//! protected user lookup, and refresh grant.

use std::time::Duration;

use authsmoke::client::{ServiceClient, ServicePaths};
use authsmoke::poll::{PollError, RetryPolicy};
use authsmoke::scenario::{Credentials, Scenario};
use authsmoke_specs::StubAuthService;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new("stub service up?")
        .max_attempts(max_attempts)
        .per_attempt_timeout(Duration::from_secs(2))
        .delay(Duration::from_millis(10))
}

fn client_for(service: &StubAuthService) -> ServiceClient {
    authsmoke::ensure_crypto();
    ServiceClient::new(service.base_url(), ServicePaths::default())
}

fn test_credentials() -> Credentials {
    Credentials {
        name: "new-test-user".into(),
        email: "new-test-user@example.com".into(),
        password: "secret".into(),
    }
}

// -- Readiness ----------------------------------------------------------------

#[tokio::test]
async fn health_endpoint_reports_up() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    authsmoke::ensure_crypto();

    let resp: serde_json::Value =
        reqwest::get(format!("{}/status", service.base_url())).await?.json().await?;
    assert_eq!(resp["status"], "up");

    Ok(())
}

#[tokio::test]
async fn ready_after_transient_health_failures() -> anyhow::Result<()> {
    let service = StubAuthService::build().unhealthy_probes(2).spawn().await?;
    let client = client_for(&service);

    let health = client.wait_ready(&fast_policy(10)).await?;

    assert!(health.is_up());
    assert_eq!(service.health_probes(), 3, "readiness should land on the third probe");

    Ok(())
}

#[tokio::test]
async fn wait_ready_exhausts_against_dead_service() -> anyhow::Result<()> {
    let service = StubAuthService::build().unhealthy_probes(u64::MAX).spawn().await?;
    let client = client_for(&service);

    let result = client.wait_ready(&fast_policy(4)).await;

    match result {
        Err(e @ PollError::Exhausted { .. }) => {
            assert_eq!(e.attempts(), 4);
            assert!(e.to_string().contains("status \"down\""), "unexpected error: {e}");
        }
        Ok(h) => anyhow::bail!("expected exhaustion, service reported {:?}", h.status),
    }
    assert_eq!(service.health_probes(), 4);

    Ok(())
}

// -- Full scenario ------------------------------------------------------------

#[tokio::test]
async fn full_registration_and_token_flow() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let mut scenario = Scenario::new(client_for(&service), test_credentials());

    scenario.wait_ready(&fast_policy(10)).await?;
    scenario.register().await?;
    scenario.confirm().await?;
    scenario.login().await?;

    let user = scenario.verify_user().await?;
    assert_eq!(user.name, "new-test-user");
    assert_eq!(user.email, "new-test-user@example.com");

    let before = scenario.token().map(|t| t.access_token.clone());
    scenario.refresh().await?;
    let after = scenario.token().map(|t| t.access_token.clone());
    assert!(after.as_deref().is_some_and(|t| !t.is_empty()));
    assert_ne!(before, after, "refresh must rotate the access token");

    // The rotated token still resolves the same user.
    let user = scenario.verify_user().await?;
    assert_eq!(user.name, "new-test-user");

    Ok(())
}

// -- One-shot failures stay fatal ---------------------------------------------

#[tokio::test]
async fn login_before_confirm_is_rejected() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let mut scenario = Scenario::new(client_for(&service), test_credentials());

    scenario.register().await?;
    let err = match scenario.login().await {
        Err(e) => e,
        Ok(()) => anyhow::bail!("unconfirmed user should not be able to log in"),
    };
    assert!(err.to_string().contains("password grant failed"), "unexpected error: {err:#}");

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let client = client_for(&service);
    let mut first = Scenario::new(client, test_credentials());

    first.register().await?;

    let mut second = Scenario::new(client_for(&service), test_credentials());
    let err = match second.register().await {
        Err(e) => e,
        Ok(()) => anyhow::bail!("duplicate registration should be rejected"),
    };
    assert!(err.to_string().contains("UserExists"), "unexpected error: {err:#}");

    Ok(())
}

#[tokio::test]
async fn bogus_confirm_token_is_rejected() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let client = client_for(&service);

    let err = match client.confirm("not-a-real-token").await {
        Err(e) => e,
        Ok(v) => anyhow::bail!("bogus confirm token should be rejected, got {v}"),
    };
    assert!(err.to_string().contains("confirmation failed"), "unexpected error: {err:#}");

    Ok(())
}

#[tokio::test]
async fn refresh_with_unknown_token_is_rejected() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let client = client_for(&service);

    let err = match client.refresh_grant("unknown-refresh-token").await {
        Err(e) => e,
        Ok(t) => anyhow::bail!("unknown refresh token should be rejected, got {t:?}"),
    };
    assert!(err.to_string().contains("refresh grant failed"), "unexpected error: {err:#}");

    Ok(())
}

#[tokio::test]
async fn user_lookup_with_bogus_token_is_rejected() -> anyhow::Result<()> {
    let service = StubAuthService::spawn().await?;
    let client = client_for(&service);

    let token = authsmoke::oauth::TokenResponse {
        access_token: "bogus".into(),
        refresh_token: None,
        expires_in: 0,
        token_type: Some("Bearer".into()),
    };
    let err = match client.current_user(&token).await {
        Err(e) => e,
        Ok(u) => anyhow::bail!("bogus access token should be rejected, got {u:?}"),
    };
    assert!(err.to_string().contains("user lookup failed"), "unexpected error: {err:#}");

    Ok(())
}
