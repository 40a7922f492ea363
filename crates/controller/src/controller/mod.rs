//! Controllers binding console operations to backend exchanges and display state.
//!
//! Every operation follows the same sequence: commit any immediate display
//! state, await one backend exchange, interpret the reply and commit the
//! settled state to the region that triggered it. Nothing is cancelled,
//! retried or ordered: overlapping operations on one region settle in
//! response-arrival order.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use client_core::Gateway;
use serde::{Deserialize, Serialize};
use shared::error::GatewayError;
use tracing::{debug, warn};

use crate::view::{Epoch, Presentation};

mod hosts;
mod maintenance;
mod playbooks;
pub mod sidebar;
mod state;
mod status;

pub use sidebar::{DisplayToggle, SidebarBehavior, SidebarKind, SlideToggle};
pub use state::{ConsoleState, HostsMode, HostsState};
pub use status::format_status;

pub const RUN_PLACEHOLDER: &str = "Running, please wait...";
pub const PREVIEW_PLACEHOLDER: &str = "Loading...";
pub const FETCH_FALLBACK: &str = "Error fetching content.";
pub const HOSTS_SAVED: &str = "Hosts saved.";
pub const HISTORY_CLEARED: &str = "History cleared.";
pub const PLAYBOOKS_DIR_UPDATED: &str = "Playbooks directory updated.";
pub const HISTORY_IMPORTED: &str = "History imported.";
pub const DEFAULT_RUN_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// What to do when an exchange fails before any payload arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportPolicy {
    /// Log and leave the triggering region in its placeholder state.
    #[default]
    Silent,
    /// Commit a generic failure message where the result would have gone.
    Surface,
}

/// What to do with a reply that carries neither the expected field nor `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Keep per-operation behaviour: run keeps its placeholder, status
    /// renders `undefined`, history reset stays silent.
    #[default]
    Preserve,
    /// Commit [`FETCH_FALLBACK`] (or the reply's message) instead.
    Surface,
}

impl std::str::FromStr for TransportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "surface" => Ok(Self::Surface),
            other => Err(format!("unknown transport policy '{other}'")),
        }
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "surface" => Ok(Self::Surface),
            other => Err(format!("unknown fallback policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Floor between a run reply arriving and its result being committed.
    pub run_settle_delay: Duration,
    pub transport_policy: TransportPolicy,
    pub fallback_policy: FallbackPolicy,
    pub sidebar: SidebarKind,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            run_settle_delay: DEFAULT_RUN_SETTLE_DELAY,
            transport_policy: TransportPolicy::default(),
            fallback_policy: FallbackPolicy::default(),
            sidebar: SidebarKind::default(),
        }
    }
}

/// Outcome committed by one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    Output(String),
    Error(String),
    /// Nothing was committed; the target keeps whatever it showed before.
    Pending,
}

impl Settled {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Output(text) | Self::Error(text) => Some(text),
            Self::Pending => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Output(_) => "output",
            Self::Error(_) => "error",
            Self::Pending => "pending",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// One console session: the controller set, its typed state and the page it drives.
pub struct Console {
    gateway: Arc<dyn Gateway>,
    view: Arc<dyn Presentation>,
    options: ConsoleOptions,
    sidebar: Box<dyn SidebarBehavior>,
    state: Mutex<ConsoleState>,
}

impl Console {
    pub fn new(gateway: Arc<dyn Gateway>, view: Arc<dyn Presentation>) -> Self {
        Self::with_options(gateway, view, ConsoleOptions::default())
    }

    pub fn with_options(
        gateway: Arc<dyn Gateway>,
        view: Arc<dyn Presentation>,
        options: ConsoleOptions,
    ) -> Self {
        Self {
            gateway,
            view,
            sidebar: options.sidebar.behavior(),
            options,
            state: Mutex::new(ConsoleState::default()),
        }
    }

    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    pub fn state(&self) -> ConsoleState {
        *self.lock_state()
    }

    pub fn hosts_state(&self) -> HostsState {
        self.lock_state().hosts
    }

    /// Flip sidebar visibility and commit the configured collapse style.
    pub fn toggle_sidebar(&self) -> Settled {
        let style = {
            let mut state = self.lock_state();
            let style = self.sidebar.next(state.sidebar);
            state.sidebar = Some(style);
            self.view.style_sidebar(style);
            style
        };
        debug!(css = style.css(), "sidebar toggled");
        Settled::Output(style.css().to_string())
    }

    fn lock_state(&self) -> MutexGuard<'_, ConsoleState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Re-render of the page; client-side state starts over with it.
    fn reload(&self) {
        let mut state = self.lock_state();
        *state = ConsoleState::default();
        self.view.reload();
    }

    /// Whether the page has been re-rendered since `epoch`.
    fn reloaded_since(&self, epoch: Epoch) -> bool {
        self.view.epoch() != epoch
    }

    /// Result of an operation that outlived the page it started on.
    fn dropped(&self, operation: &'static str) -> Settled {
        debug!(operation, "page reloaded while in flight; result dropped");
        Settled::Pending
    }

    /// Surface the outcome as a notification, unless the page was reloaded since `epoch`.
    fn announce(&self, epoch: Epoch, operation: &'static str, settled: Settled) -> Settled {
        if self.reloaded_since(epoch) {
            return self.dropped(operation);
        }
        if let Some(message) = settled.text() {
            self.view.notify(message);
        }
        settled
    }

    fn transport_failure(&self, operation: &'static str, err: &GatewayError) -> Settled {
        warn!(operation, error = %err, "backend exchange failed");
        match self.options.transport_policy {
            TransportPolicy::Silent => Settled::Pending,
            TransportPolicy::Surface => Settled::Error(format!("Request failed: {err}")),
        }
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
