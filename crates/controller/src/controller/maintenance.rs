//! Fire-and-confirm operations: history, theme and playbook directory settings.

use shared::{domain::HistoryFormat, protocol::AckReply};
use tracing::{debug, info};

use super::{
    Console, FallbackPolicy, Settled, FETCH_FALLBACK, HISTORY_CLEARED, HISTORY_IMPORTED,
    PLAYBOOKS_DIR_UPDATED,
};
use crate::error::ControllerError;

impl Console {
    /// Wipe the run history; on confirmation the page is reloaded.
    pub async fn clear_history(&self) -> Result<Settled, ControllerError> {
        let epoch = self.view.epoch();
        let settled = match self.gateway.clear_history().await {
            Ok(ack) if ack.is_ok() => {
                if self.reloaded_since(epoch) {
                    return Ok(self.dropped("clear_history"));
                }
                info!("run history cleared");
                self.view.notify(HISTORY_CLEARED);
                self.reload();
                return Ok(Settled::Output(HISTORY_CLEARED.to_string()));
            }
            Ok(ack) => match self.options.fallback_policy {
                FallbackPolicy::Preserve => {
                    debug!(error = ?ack.error(), "history reset not confirmed; ignoring");
                    Settled::Pending
                }
                FallbackPolicy::Surface => {
                    Settled::Error(ack.error().unwrap_or(FETCH_FALLBACK).to_string())
                }
            },
            Err(err) => self.transport_failure("clear_history", &err),
        };

        Ok(self.announce(epoch, "clear_history", settled))
    }

    /// Ask the backend to flip the theme and re-render; the reply is not inspected.
    pub async fn toggle_theme(&self) -> Result<Settled, ControllerError> {
        let epoch = self.view.epoch();
        match self.gateway.toggle_theme().await {
            Ok(reply) => {
                if self.reloaded_since(epoch) {
                    return Ok(self.dropped("toggle_theme"));
                }
                debug!(%reply, "theme toggled");
                self.reload();
                Ok(Settled::Output(String::new()))
            }
            Err(err) => {
                let settled = self.transport_failure("toggle_theme", &err);
                Ok(self.announce(epoch, "toggle_theme", settled))
            }
        }
    }

    /// Point the backend at a different playbook directory.
    pub async fn update_playbooks_dir(
        &self,
        playbooks_dir: &str,
    ) -> Result<Settled, ControllerError> {
        info!(playbooks_dir, "updating playbooks directory");
        let epoch = self.view.epoch();
        let settled = match self.gateway.update_playbooks_dir(playbooks_dir).await {
            Ok(ack) => self.acknowledged(&ack, PLAYBOOKS_DIR_UPDATED),
            Err(err) => self.transport_failure("update_playbooks_dir", &err),
        };
        Ok(self.announce(epoch, "update_playbooks_dir", settled))
    }

    /// Download the run history as raw `json` or `csv` text.
    pub async fn export_history(&self, format: HistoryFormat) -> Result<String, ControllerError> {
        let body = self.gateway.export_history(format).await?;
        info!(format = format.as_query(), bytes = body.len(), "history exported");
        Ok(body)
    }

    /// Replace the run history with an uploaded `.json` or `.csv` file.
    ///
    /// The file type is judged by the backend from `filename`.
    pub async fn import_history(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<Settled, ControllerError> {
        info!(filename, bytes = contents.len(), "importing run history");
        let epoch = self.view.epoch();
        let settled = match self.gateway.import_history(filename, contents).await {
            Ok(ack) => self.acknowledged(&ack, HISTORY_IMPORTED),
            Err(err) => self.transport_failure("import_history", &err),
        };
        Ok(self.announce(epoch, "import_history", settled))
    }

    fn acknowledged(&self, ack: &AckReply, confirmation: &str) -> Settled {
        if ack.is_ok() {
            return Settled::Output(ack.message().unwrap_or(confirmation).to_string());
        }
        match (ack.error(), self.options.fallback_policy) {
            (Some(error), _) => Settled::Error(error.to_string()),
            (None, FallbackPolicy::Preserve) => Settled::Pending,
            (None, FallbackPolicy::Surface) => Settled::Error(FETCH_FALLBACK.to_string()),
        }
    }
}
