// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// The offscreen surface could not be allocated.
    #[error("cannot create {width}x{height} surface: {reason}")]
    ResourceCreation {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// The host's live surface is detached or already borrowed.
    #[error("host surface unavailable")]
    HostSurfaceUnavailable,

    #[error("invalid fill style '{0}'")]
    InvalidFillStyle(String),

    #[error("config error: {0}")]
    Config(String),
}
