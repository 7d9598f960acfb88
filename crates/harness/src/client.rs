// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for one user-registration/OAuth2 service instance.
//!
//! Every call here is a single request/response round trip; the only
//! retried operation is [`ServiceClient::wait_ready`], which layers the
//! readiness poller over the health endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::oauth::TokenResponse;
use crate::poll::{poll, PollError, RetryPolicy};

/// Endpoint paths of the target service, relative to its base URL.
#[derive(Debug, Clone)]
pub struct ServicePaths {
    pub health: String,
    pub register: String,
    pub confirm: String,
    pub token: String,
    pub me: String,
}

impl Default for ServicePaths {
    fn default() -> Self {
        Self {
            health: "/status".into(),
            register: "/oauth/register".into(),
            confirm: "/oauth/register/confirm".into(),
            token: "/oauth/token".into(),
            me: "/oauth/me".into(),
        }
    }
}

/// Health document reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Registration acknowledgement carrying the one-time confirm token.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub confirm_token: String,
}

/// Protected user record returned by the `me` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

/// HTTP client wrapper for one service instance.
pub struct ServiceClient {
    base_url: String,
    paths: ServicePaths,
    client: Client,
}

impl ServiceClient {
    pub fn new(base_url: String, paths: ServicePaths) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { base_url, paths, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the health document once.
    pub async fn health(&self) -> anyhow::Result<HealthStatus> {
        let resp = self.client.get(self.url(&self.paths.health)).send().await?;
        let status = resp.error_for_status()?.json().await?;
        Ok(status)
    }

    /// Poll the health endpoint until the service reports `up`.
    pub async fn wait_ready(&self, policy: &RetryPolicy) -> Result<HealthStatus, PollError> {
        poll(policy, || async move {
            let health = self.health().await?;
            anyhow::ensure!(health.is_up(), "service reported status {:?}", health.status);
            Ok(health)
        })
        .await
    }

    /// Register a new user, returning the confirm token to redeem.
    pub async fn register(&self, req: &RegisterRequest) -> anyhow::Result<RegisterResponse> {
        let resp = self
            .client
            .post(self.url(&self.paths.register))
            .json(req)
            .send()
            .await?;
        expect_success(resp, "registration").await?.json().await.map_err(Into::into)
    }

    /// Redeem a confirm token to activate the account.
    pub async fn confirm(&self, confirm_token: &str) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .client
            .get(self.url(&self.paths.confirm))
            .query(&[("confirm_token", confirm_token)])
            .send()
            .await?;
        expect_success(resp, "confirmation").await?.json().await.map_err(Into::into)
    }

    /// Exchange a username/password pair for a token pair.
    pub async fn password_grant(
        &self,
        username: &str,
        password: &str,
    ) -> anyhow::Result<TokenResponse> {
        let resp = self
            .client
            .post(self.url(&self.paths.token))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;
        expect_success(resp, "password grant").await?.json().await.map_err(Into::into)
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh_grant(&self, refresh_token: &str) -> anyhow::Result<TokenResponse> {
        let resp = self
            .client
            .post(self.url(&self.paths.token))
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;
        expect_success(resp, "refresh grant").await?.json().await.map_err(Into::into)
    }

    /// Fetch the user record behind the given access token.
    pub async fn current_user(&self, token: &TokenResponse) -> anyhow::Result<UserInfo> {
        let resp = self
            .client
            .get(self.url(&self.paths.me))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", token.scheme(), token.access_token),
            )
            .send()
            .await?;
        expect_success(resp, "user lookup").await?.json().await.map_err(Into::into)
    }
}

/// Turn a non-2xx response into an error carrying status and body text.
async fn expect_success(
    resp: reqwest::Response,
    what: &str,
) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    anyhow::bail!("{what} failed ({status}): {text}")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
