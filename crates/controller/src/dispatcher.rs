//! Trigger wiring: one handler per page element, resolved to a console operation.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use shared::domain::{ElementId, PlaybookId};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    controller::{Console, HostsMode, HostsState, Settled},
    error::{ControllerError, DispatchError},
    view::{ElementDef, Markup, Role},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(PlaybookId),
    Show(PlaybookId),
    ToggleSidebar,
    ShowHosts,
    EditHosts,
    SaveHosts,
    CheckStatus,
    ClearHistory,
    ToggleTheme,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Show(_) => "show",
            Self::ToggleSidebar => "toggle_sidebar",
            Self::ShowHosts => "show_hosts",
            Self::EditHosts => "edit_hosts",
            Self::SaveHosts => "save_hosts",
            Self::CheckStatus => "check_status",
            Self::ClearHistory => "clear_history",
            Self::ToggleTheme => "toggle_theme",
        }
    }
}

pub type ActionHandle = JoinHandle<Result<Settled, ControllerError>>;

impl Console {
    pub async fn perform(&self, action: Action) -> Result<Settled, ControllerError> {
        match action {
            Action::Run(playbook) => self.run(&playbook).await,
            Action::Show(playbook) => self.show(&playbook).await,
            Action::ToggleSidebar => Ok(self.toggle_sidebar()),
            Action::ShowHosts => self.show_hosts().await.map(hosts_settled),
            Action::EditHosts => self.edit_hosts().await.map(hosts_settled),
            Action::SaveHosts => self.save_hosts().await,
            Action::CheckStatus => self.check_status().await,
            Action::ClearHistory => self.clear_history().await,
            Action::ToggleTheme => self.toggle_theme().await,
        }
    }
}

fn hosts_settled(state: HostsState) -> Settled {
    match state {
        HostsState::Visible(HostsMode::ReadOnly) => Settled::Output("read-only".to_string()),
        HostsState::Visible(HostsMode::Editable) => Settled::Output("editable".to_string()),
        HostsState::Hidden => Settled::Error("hidden".to_string()),
    }
}

/// Handlers attached to the page at startup.
pub struct Dispatcher {
    console: Arc<Console>,
    bindings: HashMap<ElementId, Action>,
}

impl Dispatcher {
    /// Attach one handler to every trigger present in `markup`.
    ///
    /// Optional affordances are skipped when their companion elements are
    /// missing. A run or show trigger without a playbook attribute fails the
    /// whole wiring.
    pub fn wire(console: Arc<Console>, markup: &Markup) -> Result<Self, DispatchError> {
        let hosts_ready = markup.has_roles(&Role::HOSTS_PANEL);
        let status_ready = markup.has_roles(&[Role::StatusButton, Role::StatusBox]);
        let sidebar_ready = markup.has_roles(&[Role::SidebarToggle, Role::Sidebar]);

        let mut bindings: HashMap<ElementId, Action> = HashMap::new();
        for element in markup.elements() {
            let action = match element.role {
                Role::RunButton => Action::Run(require_playbook(element)?),
                Role::ShowButton => Action::Show(require_playbook(element)?),
                Role::SidebarToggle if sidebar_ready => Action::ToggleSidebar,
                Role::ShowHostsButton if hosts_ready => Action::ShowHosts,
                Role::EditHostsButton if hosts_ready => Action::EditHosts,
                Role::SaveHostsButton if hosts_ready => Action::SaveHosts,
                Role::StatusButton if status_ready => Action::CheckStatus,
                Role::ClearHistoryButton => Action::ClearHistory,
                Role::ToggleThemeButton => Action::ToggleTheme,
                _ => continue,
            };

            match bindings.entry(element.id.clone()) {
                Entry::Occupied(existing) => warn!(
                    element = %element.id,
                    bound = existing.get().name(),
                    skipped = action.name(),
                    "element already has a handler"
                ),
                Entry::Vacant(slot) => {
                    debug!(element = %element.id, action = action.name(), "handler attached");
                    slot.insert(action);
                }
            }
        }

        info!(
            handlers = bindings.len(),
            hosts = hosts_ready,
            status = status_ready,
            sidebar = sidebar_ready,
            "console triggers wired"
        );
        Ok(Self { console, bindings })
    }

    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    pub fn action(&self, element: &ElementId) -> Option<&Action> {
        self.bindings.get(element)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Fire the handler bound to `element`. The operation runs as its own
    /// task; the caller is never blocked on the exchange.
    pub fn fire(&self, element: &ElementId) -> Result<ActionHandle, DispatchError> {
        let action = self
            .bindings
            .get(element)
            .cloned()
            .ok_or_else(|| DispatchError::Unbound(element.clone()))?;
        debug!(element = %element, action = action.name(), "trigger fired");

        let console = Arc::clone(&self.console);
        Ok(tokio::spawn(async move { console.perform(action).await }))
    }
}

fn require_playbook(element: &ElementDef) -> Result<PlaybookId, DispatchError> {
    element
        .playbook
        .clone()
        .filter(|playbook| !playbook.as_str().is_empty())
        .ok_or_else(|| DispatchError::MissingPlaybook(element.id.clone()))
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
