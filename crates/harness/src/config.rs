// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::ServicePaths;
use crate::poll::RetryPolicy;
use crate::scenario::Credentials;

/// Configuration for the authsmoke harness.
#[derive(Debug, Clone, clap::Parser)]
pub struct SmokeConfig {
    /// Base URL of the service under test.
    #[arg(long, default_value = "http://127.0.0.1:8080", env = "AUTHSMOKE_BASE_URL")]
    pub base_url: String,

    /// Health endpoint path.
    #[arg(long, default_value = "/status", env = "AUTHSMOKE_HEALTH_PATH")]
    pub health_path: String,

    /// Registration endpoint path.
    #[arg(long, default_value = "/oauth/register", env = "AUTHSMOKE_REGISTER_PATH")]
    pub register_path: String,

    /// Registration confirm endpoint path.
    #[arg(long, default_value = "/oauth/register/confirm", env = "AUTHSMOKE_CONFIRM_PATH")]
    pub confirm_path: String,

    /// OAuth2 token endpoint path.
    #[arg(long, default_value = "/oauth/token", env = "AUTHSMOKE_TOKEN_PATH")]
    pub token_path: String,

    /// Protected user endpoint path.
    #[arg(long, default_value = "/oauth/me", env = "AUTHSMOKE_ME_PATH")]
    pub me_path: String,

    /// Max readiness probes before giving up.
    #[arg(long, default_value_t = 10, env = "AUTHSMOKE_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Per-probe timeout in milliseconds.
    #[arg(long, default_value_t = 2000, env = "AUTHSMOKE_PROBE_TIMEOUT_MS")]
    pub probe_timeout_ms: u64,

    /// Delay between failed probes in milliseconds.
    #[arg(long, default_value_t = 500, env = "AUTHSMOKE_POLL_DELAY_MS")]
    pub poll_delay_ms: u64,

    /// User name to register. Generated per run if unset.
    #[arg(long, env = "AUTHSMOKE_USER")]
    pub user: Option<String>,

    /// Email to register. Derived from the user name if unset.
    #[arg(long, env = "AUTHSMOKE_EMAIL")]
    pub email: Option<String>,

    /// Password to register. Generated per run if unset.
    #[arg(long, env = "AUTHSMOKE_PASSWORD")]
    pub password: Option<String>,
}

impl SmokeConfig {
    pub fn paths(&self) -> ServicePaths {
        ServicePaths {
            health: self.health_path.clone(),
            register: self.register_path.clone(),
            confirm: self.confirm_path.clone(),
            token: self.token_path.clone(),
            me: self.me_path.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(format!("service {} up?", self.base_url))
            .max_attempts(self.max_attempts)
            .per_attempt_timeout(std::time::Duration::from_millis(self.probe_timeout_ms))
            .delay(std::time::Duration::from_millis(self.poll_delay_ms))
    }

    /// Resolve scenario credentials, generating unique ones where unset so
    /// repeated runs against the same service never collide.
    pub fn credentials(&self) -> Credentials {
        let name = self
            .user
            .clone()
            .unwrap_or_else(|| format!("smoke-{}", short_id()));
        let email = self
            .email
            .clone()
            .unwrap_or_else(|| format!("{name}@example.com"));
        let password = self.password.clone().unwrap_or_else(short_id);
        Credentials { name, email, password }
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
