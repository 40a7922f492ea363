use serde_json::Value;
use shared::protocol::SystemStatusReply;
use tracing::info;

use super::{Console, FallbackPolicy, Settled, FETCH_FALLBACK};
use crate::error::ControllerError;

/// Render a status snapshot as `CPU: {cpu}% | Memory: {memory}%`.
///
/// A missing percentage renders as `undefined`, the way the page has always
/// shown it.
pub fn format_status(reply: &SystemStatusReply) -> String {
    format!(
        "CPU: {}% | Memory: {}%",
        percent(reply.cpu.as_ref()),
        percent(reply.memory.as_ref())
    )
}

fn percent(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number
            .as_f64()
            .map_or_else(|| number.to_string(), |value| value.to_string()),
        Some(other) => other.to_string(),
    }
}

impl Console {
    pub async fn check_status(&self) -> Result<Settled, ControllerError> {
        let epoch = self.view.epoch();
        let settled = match self.gateway.system_status().await {
            Ok(reply) if reply.is_complete() => Settled::Output(format_status(&reply)),
            Ok(reply) => match self.options.fallback_policy {
                FallbackPolicy::Preserve => Settled::Output(format_status(&reply)),
                FallbackPolicy::Surface => Settled::Error(
                    reply
                        .error
                        .filter(|error| !error.is_empty())
                        .unwrap_or_else(|| FETCH_FALLBACK.to_string()),
                ),
            },
            Err(err) => self.transport_failure("system_status", &err),
        };

        if let Some(text) = settled.text() {
            if !self.view.show_status(epoch, text) && self.reloaded_since(epoch) {
                return Ok(self.dropped("system_status"));
            }
            info!(status = text, "system status refreshed");
        }
        Ok(settled)
    }
}
