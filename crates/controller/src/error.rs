use shared::{
    domain::{ElementId, RegionKey},
    error::GatewayError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("display region '{0}' is not present on the page")]
    MissingRegion(RegionKey),
    #[error("{0} is not present on the page")]
    MissingElement(&'static str),
    #[error("hosts buffer is not in editable mode")]
    NotEditable,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("trigger '{0}' has no playbook attribute")]
    MissingPlaybook(ElementId),
    #[error("no handler bound to element '{0}'")]
    Unbound(ElementId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("hosts buffer is read-only")]
    ReadOnly,
    #[error("hosts panel is not present on the page")]
    NoHostsPanel,
}
