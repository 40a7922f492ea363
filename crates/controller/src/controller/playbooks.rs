use shared::domain::{PlaybookId, RegionKey};
use tracing::info;

use super::{
    Console, FallbackPolicy, Settled, FETCH_FALLBACK, PREVIEW_PLACEHOLDER, RUN_PLACEHOLDER,
};
use crate::{error::ControllerError, view::Epoch};

impl Console {
    /// Execute a playbook and commit its output to the playbook's region.
    ///
    /// The region shows [`RUN_PLACEHOLDER`] before the request is issued. A
    /// reply is held for the configured settle delay before being committed so
    /// fast runs still present a visible running state.
    pub async fn run(&self, playbook: &PlaybookId) -> Result<Settled, ControllerError> {
        let (region, epoch) = self.open_region(playbook, RUN_PLACEHOLDER)?;
        info!(playbook = %playbook, "running playbook");

        let settled = match self.gateway.run_playbook(playbook).await {
            Ok(reply) => {
                let delay = self.options.run_settle_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if let Some(output) = reply.output() {
                    Settled::Output(output.to_string())
                } else if let Some(error) = reply.error() {
                    Settled::Error(error.to_string())
                } else {
                    match self.options.fallback_policy {
                        FallbackPolicy::Preserve => Settled::Pending,
                        FallbackPolicy::Surface => Settled::Error(FETCH_FALLBACK.to_string()),
                    }
                }
            }
            Err(err) => self.transport_failure("run_playbook", &err),
        };

        let settled = self.settle_region(epoch, &region, settled, "run_playbook");
        info!(playbook = %playbook, outcome = settled.label(), "playbook run settled");
        Ok(settled)
    }

    /// Fetch a playbook's source into its region.
    pub async fn show(&self, playbook: &PlaybookId) -> Result<Settled, ControllerError> {
        let (region, epoch) = self.open_region(playbook, PREVIEW_PLACEHOLDER)?;
        info!(playbook = %playbook, "loading playbook preview");

        let settled = match self.gateway.show_playbook(playbook).await {
            Ok(reply) => match (reply.content(), reply.error()) {
                (Some(content), _) => Settled::Output(content.to_string()),
                (None, Some(error)) => Settled::Error(error.to_string()),
                (None, None) => Settled::Error(FETCH_FALLBACK.to_string()),
            },
            Err(err) => self.transport_failure("show_playbook", &err),
        };

        Ok(self.settle_region(epoch, &region, settled, "show_playbook"))
    }

    fn open_region(
        &self,
        playbook: &PlaybookId,
        placeholder: &str,
    ) -> Result<(RegionKey, Epoch), ControllerError> {
        let region = playbook.region_key();
        if !self.view.has_region(&region) {
            return Err(ControllerError::MissingRegion(region));
        }
        let epoch = self.view.epoch();
        self.view.show_region(epoch, &region, placeholder);
        Ok((region, epoch))
    }

    fn settle_region(
        &self,
        epoch: Epoch,
        region: &RegionKey,
        settled: Settled,
        operation: &'static str,
    ) -> Settled {
        if let Some(text) = settled.text() {
            if !self.view.show_region(epoch, region, text) && self.reloaded_since(epoch) {
                return self.dropped(operation);
            }
        }
        settled
    }
}
