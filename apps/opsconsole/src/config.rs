use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::GatewayConfig;
use controller::{ConsoleOptions, FallbackPolicy, SidebarKind, TransportPolicy};
use serde::Deserialize;
use shared::protocol::Routes;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "opsconsole.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub run_settle_delay_ms: u64,
    /// `None` or `0` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    pub transport_policy: TransportPolicy,
    #[serde(alias = "missing_field_policy")]
    pub fallback_policy: FallbackPolicy,
    pub sidebar: SidebarKind,
    pub routes: Routes,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            run_settle_delay_ms: 1000,
            request_timeout_secs: None,
            transport_policy: TransportPolicy::default(),
            fallback_policy: FallbackPolicy::default(),
            sidebar: SidebarKind::default(),
            routes: Routes::default(),
        }
    }
}

impl Settings {
    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            run_settle_delay: Duration::from_millis(self.run_settle_delay_ms),
            transport_policy: self.transport_policy,
            fallback_policy: self.fallback_policy,
            sidebar: self.sidebar,
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            server_url: self.server_url.clone(),
            routes: self.routes.clone(),
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Settings from `path` (absent file means defaults), then process env overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file {}", path.display()))
        }
    };

    apply_env(&mut settings, env);
    Ok(settings)
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("OPSCONSOLE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__RUN_SETTLE_DELAY_MS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.run_settle_delay_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__RUN_SETTLE_DELAY_MS"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(0) => settings.request_timeout_secs = None,
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = env("APP__TRANSPORT_POLICY") {
        match v.parse() {
            Ok(parsed) => settings.transport_policy = parsed,
            Err(err) => warn!(%err, "ignoring APP__TRANSPORT_POLICY"),
        }
    }
    if let Some(v) = env("APP__MISSING_FIELD_POLICY") {
        match v.parse() {
            Ok(parsed) => settings.fallback_policy = parsed,
            Err(err) => warn!(%err, "ignoring APP__MISSING_FIELD_POLICY"),
        }
    }
    if let Some(v) = env("APP__SIDEBAR") {
        match v.parse() {
            Ok(parsed) => settings.sidebar = parsed,
            Err(err) => warn!(%err, "ignoring APP__SIDEBAR"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
