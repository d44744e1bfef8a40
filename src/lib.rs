//! Pause screen overlay for 2D game stages: freezes the current frame,
//! dims it and pulses a "play" arrow until the game resumes.
pub mod config;
pub mod core;
pub mod error;
pub mod ui;

pub use crate::config::OverlayConfig;
pub use crate::core::canvas::{Canvas, DrawContext};
pub use crate::core::stage::{Stage, SurfaceProvider};
pub use crate::error::OverlayError;
pub use crate::ui::anim::{Ease, TweenEvent, TweenFactory, TweenId, TweenManager};
pub use crate::ui::color::PulseColor;
pub use crate::ui::components::pause_overlay::{arrow_points, FadePhase, OverlayState, PauseOverlay};
