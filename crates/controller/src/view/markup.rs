//! Page anchors the console binds to: trigger elements and the regions they drive.

use shared::domain::{ElementId, PlaybookId};

pub const TOGGLE_SIDEBAR_BTN: &str = "toggle-sidebar-btn";
pub const SIDEBAR: &str = "sidebar";
pub const SHOW_HOSTS_BTN: &str = "show-hosts-btn";
pub const EDIT_HOSTS_BTN: &str = "edit-hosts-btn";
pub const HOSTS_BOX: &str = "hosts-box";
pub const HOSTS_CONTENT: &str = "hosts-content";
pub const SAVE_HOSTS_BTN: &str = "save-hosts-btn";
pub const HOSTS_ERROR: &str = "hosts-error";
pub const STATUS_BTN: &str = "status-btn";
pub const STATUS_BOX: &str = "status-box";
pub const CLEAR_HISTORY_BTN: &str = "clear-history-btn";
pub const TOGGLE_THEME_BTN: &str = "toggle-dark-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    RunButton,
    ShowButton,
    OutputRegion,
    SidebarToggle,
    Sidebar,
    ShowHostsButton,
    EditHostsButton,
    SaveHostsButton,
    HostsBox,
    HostsContent,
    HostsError,
    StatusButton,
    StatusBox,
    ClearHistoryButton,
    ToggleThemeButton,
}

impl Role {
    /// Elements the hosts editor needs before any of its triggers is wired.
    pub const HOSTS_PANEL: [Role; 6] = [
        Role::ShowHostsButton,
        Role::EditHostsButton,
        Role::HostsBox,
        Role::HostsContent,
        Role::SaveHostsButton,
        Role::HostsError,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub id: ElementId,
    pub role: Role,
    /// `data-playbook` attribute; required on run/show triggers.
    pub playbook: Option<PlaybookId>,
}

#[derive(Debug, Clone, Default)]
pub struct Markup {
    elements: Vec<ElementDef>,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full console page: one run/show/output triple per playbook plus every
    /// fixed affordance.
    pub fn console<I, P>(playbooks: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlaybookId>,
    {
        playbooks
            .into_iter()
            .fold(Self::new(), |markup, playbook| markup.playbook(playbook))
            .sidebar()
            .hosts_panel()
            .status_panel()
            .clear_history_button()
            .theme_button()
    }

    pub fn element(
        mut self,
        id: impl Into<ElementId>,
        role: Role,
        playbook: Option<PlaybookId>,
    ) -> Self {
        self.elements.push(ElementDef {
            id: id.into(),
            role,
            playbook,
        });
        self
    }

    pub fn playbook(self, playbook: impl Into<PlaybookId>) -> Self {
        let playbook = playbook.into();
        let region = playbook.region_key();
        self.element(
            format!("run-{playbook}"),
            Role::RunButton,
            Some(playbook.clone()),
        )
        .element(
            format!("show-{playbook}"),
            Role::ShowButton,
            Some(playbook.clone()),
        )
        .element(region.0, Role::OutputRegion, Some(playbook))
    }

    pub fn sidebar(self) -> Self {
        self.element(TOGGLE_SIDEBAR_BTN, Role::SidebarToggle, None)
            .element(SIDEBAR, Role::Sidebar, None)
    }

    pub fn hosts_panel(self) -> Self {
        self.element(SHOW_HOSTS_BTN, Role::ShowHostsButton, None)
            .element(EDIT_HOSTS_BTN, Role::EditHostsButton, None)
            .element(HOSTS_BOX, Role::HostsBox, None)
            .element(HOSTS_CONTENT, Role::HostsContent, None)
            .element(SAVE_HOSTS_BTN, Role::SaveHostsButton, None)
            .element(HOSTS_ERROR, Role::HostsError, None)
    }

    pub fn status_panel(self) -> Self {
        self.element(STATUS_BTN, Role::StatusButton, None)
            .element(STATUS_BOX, Role::StatusBox, None)
    }

    pub fn clear_history_button(self) -> Self {
        self.element(CLEAR_HISTORY_BTN, Role::ClearHistoryButton, None)
    }

    pub fn theme_button(self) -> Self {
        self.element(TOGGLE_THEME_BTN, Role::ToggleThemeButton, None)
    }

    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.elements.iter().any(|element| element.role == role)
    }

    pub fn has_roles(&self, roles: &[Role]) -> bool {
        roles.iter().all(|role| self.has_role(*role))
    }
}
