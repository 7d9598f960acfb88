// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario-scoped state for the registration/login smoke flow.
//!
//! Each [`Scenario`] owns its client, credentials, and every token it has
//! collected so far. Steps run strictly in sequence; a step that needs the
//! output of an earlier one fails with a precondition error instead of
//! reading ambient state.

use crate::client::{RegisterRequest, ServiceClient, UserInfo};
use crate::oauth::TokenResponse;
use crate::poll::RetryPolicy;

/// Credentials for one scenario's user.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// One smoke scenario against one service instance.
pub struct Scenario {
    client: ServiceClient,
    credentials: Credentials,
    confirm_token: Option<String>,
    token: Option<TokenResponse>,
}

impl Scenario {
    pub fn new(client: ServiceClient, credentials: Credentials) -> Self {
        Self { client, credentials, confirm_token: None, token: None }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The current token pair, if a grant has been performed.
    pub fn token(&self) -> Option<&TokenResponse> {
        self.token.as_ref()
    }

    /// Poll the service health endpoint until it reports `up`.
    pub async fn wait_ready(&self, policy: &RetryPolicy) -> anyhow::Result<()> {
        self.client.wait_ready(policy).await?;
        Ok(())
    }

    /// Register the scenario user and stash the confirm token.
    pub async fn register(&mut self) -> anyhow::Result<()> {
        let req = RegisterRequest {
            name: self.credentials.name.clone(),
            email: self.credentials.email.clone(),
            password: self.credentials.password.clone(),
        };
        let resp = self.client.register(&req).await?;
        anyhow::ensure!(!resp.confirm_token.is_empty(), "registration returned an empty confirm token");
        tracing::debug!(confirm_token = %resp.confirm_token, "registration accepted");
        self.confirm_token = Some(resp.confirm_token);
        Ok(())
    }

    /// Redeem the confirm token from [`Scenario::register`].
    pub async fn confirm(&mut self) -> anyhow::Result<()> {
        let token = self
            .confirm_token
            .take()
            .ok_or_else(|| anyhow::anyhow!("no confirm token: register must run first"))?;
        self.client.confirm(&token).await?;
        Ok(())
    }

    /// Password-grant login with the scenario credentials.
    pub async fn login(&mut self) -> anyhow::Result<()> {
        let token = self
            .client
            .password_grant(&self.credentials.name, &self.credentials.password)
            .await?;
        anyhow::ensure!(!token.access_token.is_empty(), "password grant returned an empty access token");
        anyhow::ensure!(
            token.refresh_token.as_deref().is_some_and(|t| !t.is_empty()),
            "password grant returned no refresh token"
        );
        self.token = Some(token);
        Ok(())
    }

    /// Fetch the protected user record and check it matches the
    /// registered credentials.
    pub async fn verify_user(&self) -> anyhow::Result<UserInfo> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no access token: login must run first"))?;
        let user = self.client.current_user(token).await?;
        anyhow::ensure!(
            user.name == self.credentials.name,
            "service returned user {:?}, expected {:?}",
            user.name,
            self.credentials.name
        );
        anyhow::ensure!(
            user.email == self.credentials.email,
            "service returned email {:?}, expected {:?}",
            user.email,
            self.credentials.email
        );
        Ok(user)
    }

    /// Refresh-grant re-authentication; the new token pair replaces the old.
    pub async fn refresh(&mut self) -> anyhow::Result<()> {
        let old = self
            .token
            .take()
            .ok_or_else(|| anyhow::anyhow!("no refresh token: login must run first"))?;
        let refresh_token = old
            .refresh_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("current grant carries no refresh token"))?;

        let fresh = self.client.refresh_grant(refresh_token).await?;
        anyhow::ensure!(!fresh.access_token.is_empty(), "refresh grant returned an empty access token");
        anyhow::ensure!(
            fresh.access_token != old.access_token,
            "refresh grant did not rotate the access token"
        );
        self.token = Some(fresh);
        Ok(())
    }
}
