//! Typed state owned by a [`super::Console`] instance.

use crate::view::SidebarStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostsMode {
    ReadOnly,
    Editable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostsState {
    #[default]
    Hidden,
    Visible(HostsMode),
}

impl HostsState {
    pub fn is_editable(self) -> bool {
        self == Self::Visible(HostsMode::Editable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleState {
    pub hosts: HostsState,
    /// Last style the sidebar toggle committed; `None` until the first toggle.
    pub sidebar: Option<SidebarStyle>,
}
