//! Types shared between the backend gateway and the console controllers.

pub mod domain;
pub mod error;
pub mod protocol;
