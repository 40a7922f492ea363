use tracing::{debug, info};

use super::{Console, FallbackPolicy, HostsMode, HostsState, Settled, FETCH_FALLBACK, HOSTS_SAVED};
use crate::{error::ControllerError, view::HostsUpdate};

impl Console {
    /// Fetch the hosts inventory into the buffer, read-only.
    pub async fn show_hosts(&self) -> Result<HostsState, ControllerError> {
        self.load_hosts(HostsMode::ReadOnly).await
    }

    /// Fetch the hosts inventory into the buffer and unlock it for editing.
    pub async fn edit_hosts(&self) -> Result<HostsState, ControllerError> {
        self.load_hosts(HostsMode::Editable).await
    }

    /// Submit the current buffer. The editor mode is left as it is.
    pub async fn save_hosts(&self) -> Result<Settled, ControllerError> {
        if !self.hosts_state().is_editable() {
            return Err(ControllerError::NotEditable);
        }
        let content = self
            .view
            .hosts_buffer()
            .ok_or(ControllerError::MissingElement("hosts panel"))?;
        info!(bytes = content.len(), "saving hosts inventory");
        let epoch = self.view.epoch();

        let settled = match self.gateway.save_hosts(&content).await {
            Ok(ack) if ack.is_ok() => Settled::Output(HOSTS_SAVED.to_string()),
            Ok(ack) => match ack.error() {
                Some(error) => Settled::Error(error.to_string()),
                None => match self.options.fallback_policy {
                    FallbackPolicy::Preserve => Settled::Pending,
                    FallbackPolicy::Surface => Settled::Error(FETCH_FALLBACK.to_string()),
                },
            },
            Err(err) => self.transport_failure("save_hosts", &err),
        };

        Ok(self.announce(epoch, "save_hosts", settled))
    }

    async fn load_hosts(&self, mode: HostsMode) -> Result<HostsState, ControllerError> {
        if !self.view.has_hosts_panel() {
            return Err(ControllerError::MissingElement("hosts panel"));
        }
        info!(?mode, "fetching hosts inventory");
        let epoch = self.view.epoch();

        let update = match self.gateway.get_hosts().await {
            // An empty inventory is still an inventory.
            Ok(reply) => match (reply.content.as_deref(), reply.error()) {
                (Some(content), _) => Some(HostsUpdate::Loaded {
                    content: content.to_string(),
                    mode,
                }),
                (None, Some(error)) => Some(HostsUpdate::Failed {
                    error: error.to_string(),
                }),
                (None, None) => match self.options.fallback_policy {
                    FallbackPolicy::Preserve => None,
                    FallbackPolicy::Surface => Some(HostsUpdate::Failed {
                        error: FETCH_FALLBACK.to_string(),
                    }),
                },
            },
            Err(err) => self
                .transport_failure("get_hosts", &err)
                .text()
                .map(|error| HostsUpdate::Failed {
                    error: error.to_string(),
                }),
        };

        let mut state = self.lock_state();
        match update {
            Some(update) => {
                let hosts = match &update {
                    HostsUpdate::Loaded { mode, .. } => HostsState::Visible(*mode),
                    HostsUpdate::Failed { .. } => HostsState::Hidden,
                };
                if self.view.commit_hosts(epoch, update) {
                    state.hosts = hosts;
                } else {
                    debug!("hosts reply outlived its page; editor left unchanged");
                }
            }
            None => debug!("hosts reply carried no content; editor left unchanged"),
        }
        Ok(state.hosts)
    }
}
