//! Presentation boundary: what the controllers may read from and commit to the page.

use shared::domain::RegionKey;

use crate::controller::HostsMode;

pub mod markup;
pub mod page;

pub use markup::{ElementDef, Markup, Role};
pub use page::PageView;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub visible: bool,
    pub text: String,
}

/// Observable state of the hosts editor elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsPanel {
    pub box_visible: bool,
    pub content: String,
    pub readonly: bool,
    pub save_visible: bool,
    pub error: String,
}

impl Default for HostsPanel {
    fn default() -> Self {
        Self {
            box_visible: false,
            content: String::new(),
            readonly: true,
            save_visible: false,
            error: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsUpdate {
    Loaded { content: String, mode: HostsMode },
    Failed { error: String },
}

impl HostsPanel {
    pub fn apply(&mut self, update: HostsUpdate) {
        match update {
            HostsUpdate::Loaded { content, mode } => {
                self.error.clear();
                self.content = content;
                self.readonly = mode == HostsMode::ReadOnly;
                self.box_visible = true;
                self.save_visible = mode == HostsMode::Editable;
            }
            // Content is left alone; hiding the box is what keeps it from being shown.
            HostsUpdate::Failed { error } => {
                self.box_visible = false;
                self.error = error;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarStyle {
    Shown,
    Hidden,
    SlidIn,
    SlidOut,
}

impl SidebarStyle {
    pub fn css(self) -> &'static str {
        match self {
            Self::Shown => "display: block",
            Self::Hidden => "display: none",
            Self::SlidIn => "transform: translateX(0)",
            Self::SlidOut => "transform: translateX(-200px)",
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Self::Shown | Self::SlidIn)
    }
}

/// Change committed to the page, broadcast to observers such as a terminal front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    RegionUpdated { region: RegionKey, text: String },
    HostsUpdated(HostsPanel),
    StatusShown(String),
    SidebarStyled(SidebarStyle),
    Notified(String),
    Reloaded,
}

/// Render generation of a page. Every reload starts a new one.
pub type Epoch = u64;

/// Surface the controllers commit display state to.
///
/// Implementations own element lookup; a commit to an element that is not
/// present is dropped rather than reported. Commits are stamped with the
/// [`Epoch`] their operation started in and are dropped once the page has
/// been reloaded since; they return whether anything was committed.
pub trait Presentation: Send + Sync {
    fn epoch(&self) -> Epoch;

    fn has_region(&self, region: &RegionKey) -> bool;

    /// Make the region visible with `text` as its whole content.
    fn show_region(&self, epoch: Epoch, region: &RegionKey, text: &str) -> bool;

    fn has_hosts_panel(&self) -> bool;

    fn commit_hosts(&self, epoch: Epoch, update: HostsUpdate) -> bool;

    /// Current text of the hosts buffer, as the operator left it.
    fn hosts_buffer(&self) -> Option<String>;

    fn show_status(&self, epoch: Epoch, text: &str) -> bool;

    fn style_sidebar(&self, style: SidebarStyle);

    /// Operator-facing confirmation or failure message.
    fn notify(&self, message: &str);

    /// Full re-render of the page by the backend; no client state survives.
    fn reload(&self);
}
