//! Sidebar collapse styles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::view::SidebarStyle;

/// Style a sidebar takes when toggled.
///
/// `current` is `None` until the first toggle after a page render, while the
/// sidebar still carries no inline style.
pub trait SidebarBehavior: Send + Sync + fmt::Debug {
    fn next(&self, current: Option<SidebarStyle>) -> SidebarStyle;
}

/// Removes the sidebar from layout entirely.
///
/// An unstyled sidebar counts as hidden, so the first toggle after a render
/// sets it to shown and leaves the page looking the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayToggle;

impl SidebarBehavior for DisplayToggle {
    fn next(&self, current: Option<SidebarStyle>) -> SidebarStyle {
        match current {
            Some(SidebarStyle::Shown) => SidebarStyle::Hidden,
            _ => SidebarStyle::Shown,
        }
    }
}

/// Slides the sidebar off-canvas, keeping its layout slot. Starts visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideToggle;

impl SidebarBehavior for SlideToggle {
    fn next(&self, current: Option<SidebarStyle>) -> SidebarStyle {
        match current {
            Some(SidebarStyle::SlidOut) => SidebarStyle::SlidIn,
            _ => SidebarStyle::SlidOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarKind {
    #[default]
    Display,
    Slide,
}

impl SidebarKind {
    pub fn behavior(self) -> Box<dyn SidebarBehavior> {
        match self {
            Self::Display => Box::new(DisplayToggle),
            Self::Slide => Box::new(SlideToggle),
        }
    }
}

impl std::str::FromStr for SidebarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "display" => Ok(Self::Display),
            "slide" => Ok(Self::Slide),
            other => Err(format!("unknown sidebar kind '{other}'")),
        }
    }
}
