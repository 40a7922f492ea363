//! In-memory page model implementing [`Presentation`].

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use shared::domain::RegionKey;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{
    Epoch, HostsPanel, HostsUpdate, Markup, Presentation, Region, Role, SidebarStyle, ViewEvent,
};
use crate::error::ViewError;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default)]
struct PageState {
    regions: HashMap<RegionKey, Region>,
    hosts: Option<HostsPanel>,
    status: Option<Region>,
    sidebar: Option<SidebarStyle>,
    notifications: Vec<String>,
    reloads: usize,
    epoch: Epoch,
}

impl PageState {
    fn render(markup: &Markup) -> Self {
        let regions = markup
            .elements()
            .iter()
            .filter(|element| element.role == Role::OutputRegion)
            .map(|element| (RegionKey(element.id.0.clone()), Region::default()))
            .collect();

        Self {
            regions,
            hosts: markup
                .has_roles(&Role::HOSTS_PANEL)
                .then(HostsPanel::default),
            status: markup.has_role(Role::StatusBox).then(Region::default),
            sidebar: markup.has_role(Role::Sidebar).then_some(SidebarStyle::Shown),
            notifications: Vec::new(),
            reloads: 0,
            epoch: 0,
        }
    }
}

pub struct PageView {
    markup: Markup,
    state: Mutex<PageState>,
    events: broadcast::Sender<ViewEvent>,
}

impl PageView {
    pub fn new(markup: Markup) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(PageState::render(&markup)),
            markup,
            events,
        }
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn region(&self, region: &RegionKey) -> Option<Region> {
        self.lock().regions.get(region).cloned()
    }

    pub fn hosts(&self) -> Option<HostsPanel> {
        self.lock().hosts.clone()
    }

    pub fn status(&self) -> Option<Region> {
        self.lock().status.clone()
    }

    pub fn sidebar(&self) -> Option<SidebarStyle> {
        self.lock().sidebar
    }

    pub fn notifications(&self) -> Vec<String> {
        self.lock().notifications.clone()
    }

    pub fn reloads(&self) -> usize {
        self.lock().reloads
    }

    /// Operator edit of the hosts buffer. Rejected while the buffer is read-only.
    pub fn type_hosts(&self, text: impl Into<String>) -> Result<(), ViewError> {
        let mut state = self.lock();
        let hosts = state.hosts.as_mut().ok_or(ViewError::NoHostsPanel)?;
        if hosts.readonly {
            return Err(ViewError::ReadOnly);
        }
        hosts.content = text.into();
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: ViewEvent) {
        // No subscribers is the normal case outside a front-end.
        let _ = self.events.send(event);
    }
}

impl Presentation for PageView {
    fn epoch(&self) -> Epoch {
        self.lock().epoch
    }

    fn has_region(&self, region: &RegionKey) -> bool {
        self.lock().regions.contains_key(region)
    }

    fn show_region(&self, epoch: Epoch, region: &RegionKey, text: &str) -> bool {
        {
            let mut state = self.lock();
            if state.epoch != epoch {
                debug!(region = %region, "page reloaded since request; update dropped");
                return false;
            }
            let Some(slot) = state.regions.get_mut(region) else {
                warn!(region = %region, "dropping update for unknown display region");
                return false;
            };
            slot.visible = true;
            slot.text = text.to_string();
        }
        self.emit(ViewEvent::RegionUpdated {
            region: region.clone(),
            text: text.to_string(),
        });
        true
    }

    fn has_hosts_panel(&self) -> bool {
        self.lock().hosts.is_some()
    }

    fn commit_hosts(&self, epoch: Epoch, update: HostsUpdate) -> bool {
        let panel = {
            let mut state = self.lock();
            if state.epoch != epoch {
                debug!("page reloaded since request; hosts update dropped");
                return false;
            }
            let Some(hosts) = state.hosts.as_mut() else {
                debug!("hosts panel absent; update dropped");
                return false;
            };
            hosts.apply(update);
            hosts.clone()
        };
        self.emit(ViewEvent::HostsUpdated(panel));
        true
    }

    fn hosts_buffer(&self) -> Option<String> {
        self.lock().hosts.as_ref().map(|hosts| hosts.content.clone())
    }

    fn show_status(&self, epoch: Epoch, text: &str) -> bool {
        {
            let mut state = self.lock();
            if state.epoch != epoch {
                debug!("page reloaded since request; status dropped");
                return false;
            }
            let Some(status) = state.status.as_mut() else {
                debug!("status box absent; update dropped");
                return false;
            };
            status.visible = true;
            status.text = text.to_string();
        }
        self.emit(ViewEvent::StatusShown(text.to_string()));
        true
    }

    fn style_sidebar(&self, style: SidebarStyle) {
        {
            let mut state = self.lock();
            let Some(sidebar) = state.sidebar.as_mut() else {
                debug!("sidebar absent; style dropped");
                return;
            };
            *sidebar = style;
        }
        self.emit(ViewEvent::SidebarStyled(style));
    }

    fn notify(&self, message: &str) {
        self.lock().notifications.push(message.to_string());
        self.emit(ViewEvent::Notified(message.to_string()));
    }

    fn reload(&self) {
        {
            let mut state = self.lock();
            let reloads = state.reloads + 1;
            let epoch = state.epoch + 1;
            let notifications = std::mem::take(&mut state.notifications);
            *state = PageState::render(&self.markup);
            state.reloads = reloads;
            state.epoch = epoch;
            state.notifications = notifications;
        }
        self.emit(ViewEvent::Reloaded);
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
