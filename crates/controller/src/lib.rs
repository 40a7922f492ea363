//! Operations console controller: wires page triggers to backend exchanges
//! and commits the resulting display state.

pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod view;

#[cfg(test)]
mod test_support;

pub use controller::{
    Console, ConsoleOptions, FallbackPolicy, HostsMode, HostsState, Settled, SidebarKind,
    TransportPolicy,
};
pub use dispatcher::{Action, ActionHandle, Dispatcher};
pub use error::{ControllerError, DispatchError, ViewError};
pub use view::{Markup, PageView, Presentation, ViewEvent};
