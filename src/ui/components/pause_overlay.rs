// src/ui/components/pause_overlay.rs
//! Freeze-frame pause screen: dimmed snapshot of the stage with a
//! pulsing "play" arrow on top.
//!
//! Frame order while paused: forward the tween manager's events through
//! [`PauseOverlay::handle_tween_event`], then [`PauseOverlay::update`],
//! then [`PauseOverlay::render`].
use cgmath::Point2;
use log::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::core::canvas::{Canvas, DrawContext};
use crate::core::stage::SurfaceProvider;
use crate::error::OverlayError;
use crate::ui::anim::{TweenEvent, TweenFactory, TweenId};
use crate::ui::color::PulseColor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadePhase {
    /// Heading towards the dark grey.
    FadingOut,
    /// Heading back to white.
    FadingIn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayState {
    Active,
    Paused(FadePhase),
}

#[derive(Clone, Copy, Debug)]
struct Fade {
    id: TweenId,
    phase: FadePhase,
}

/// Corners of the play arrow for a stage of `w` x `h`:
/// top-left, bottom-left, apex.
pub fn arrow_points(w: f32, h: f32) -> [Point2<f32>; 3] {
    let arrow_w = (w / 2.0).round();
    let arrow_h = (h / 2.0).round();
    let (cx, cy) = (w / 2.0, h / 2.0);
    let sx = cx - arrow_w / 2.0;
    let sy = cy - arrow_h / 2.0;
    [
        Point2::new(sx, sy),
        Point2::new(sx, sy + arrow_h),
        Point2::new(sx + arrow_w, cy),
    ]
}

pub struct PauseOverlay<S: SurfaceProvider, T: TweenFactory> {
    stage: S,
    tweens: T,
    config: OverlayConfig,
    snapshot: Canvas,
    color: PulseColor,
    fade: Option<Fade>,
}

impl<S: SurfaceProvider, T: TweenFactory> PauseOverlay<S, T> {
    pub fn new(stage: S, tweens: T, config: OverlayConfig, width: u32, height: u32) -> Result<Self, OverlayError> {
        let snapshot = Canvas::new(width, height)?;
        debug!("Pause overlay created ({}x{})", width, height);
        Ok(Self {
            stage,
            tweens,
            config,
            snapshot,
            color: PulseColor::WHITE,
            fade: None,
        })
    }

    pub fn width(&self) -> u32 { self.snapshot.width() }
    pub fn height(&self) -> u32 { self.snapshot.height() }
    pub fn color(&self) -> PulseColor { self.color }
    pub fn snapshot(&self) -> &Canvas { &self.snapshot }
    pub fn fade_handle(&self) -> Option<TweenId> { self.fade.map(|f| f.id) }

    pub fn state(&self) -> OverlayState {
        match self.fade {
            Some(f) => OverlayState::Paused(f.phase),
            None => OverlayState::Active,
        }
    }

    /// Fill style the arrow is drawn with this frame.
    pub fn arrow_fill_style(&self) -> String {
        self.color.css(self.config.arrow_alpha)
    }

    /// Grabs the freeze-frame and starts pulsing. Supersedes any fade
    /// already running.
    pub fn on_paused(&mut self) -> Result<(), OverlayError> {
        let (w, h) = (self.snapshot.width() as f32, self.snapshot.height() as f32);
        let snapshot = &mut self.snapshot;
        self.stage
            .with_surface(|live| {
                snapshot.clear_rect(0.0, 0.0, w, h);
                snapshot.draw_image(live.image(), 0, 0);
            })
            .ok_or(OverlayError::HostSurfaceUnavailable)?;

        self.color = PulseColor::splat(self.config.pulse_high);
        self.cancel_fade();
        self.fade_out();
        info!("Paused: freeze-frame captured");
        Ok(())
    }

    pub fn on_resume(&mut self) {
        if self.cancel_fade() {
            info!("Resumed");
        } else {
            debug!("Resume without an active fade; ignored");
        }
    }

    /// Snaps the arrow colour to whole channel values.
    pub fn update(&mut self) {
        self.color = self.color.rounded();
    }

    pub fn render(&self) -> Result<(), OverlayError> {
        let dim = format!("rgba(0, 0, 0, {})", self.config.dim_alpha);
        let arrow = self.arrow_fill_style();
        let snapshot = self.snapshot.image();

        self.stage
            .with_surface(|ctx| -> Result<(), OverlayError> {
                let (w, h) = (ctx.width() as f32, ctx.height() as f32);
                ctx.draw_image(snapshot, 0, 0);
                ctx.set_fill_style(&dim)?;
                ctx.fill_rect(0.0, 0.0, w, h);

                let [a, b, c] = arrow_points(w, h);
                ctx.begin_path();
                ctx.move_to(a.x, a.y);
                ctx.line_to(b.x, b.y);
                ctx.line_to(c.x, c.y);
                ctx.set_fill_style(&arrow)?;
                ctx.fill();
                ctx.close_path();
                Ok(())
            })
            .ok_or(OverlayError::HostSurfaceUnavailable)?
    }

    /// Applies a tween event. Events from tweens other than the active
    /// fade are ignored.
    pub fn handle_tween_event(&mut self, ev: &TweenEvent) {
        let Some(fade) = self.fade else { return };
        if ev.id() != fade.id {
            return;
        }
        self.color = PulseColor(ev.value());
        if let TweenEvent::Completed { .. } = ev {
            self.on_fade_complete(fade.phase);
        }
    }

    // the manager retires finished tweens itself
    fn on_fade_complete(&mut self, finished: FadePhase) {
        self.fade = None;
        match finished {
            FadePhase::FadingOut => self.fade_in(),
            FadePhase::FadingIn => self.fade_out(),
        }
    }

    fn fade_out(&mut self) {
        self.start_fade(FadePhase::FadingOut, self.config.pulse_low);
    }

    fn fade_in(&mut self) {
        self.start_fade(FadePhase::FadingIn, self.config.pulse_high);
    }

    fn start_fade(&mut self, phase: FadePhase, level: f32) {
        let Some(id) = self.tweens.create(self.color.0) else {
            warn!("Pause arrow {:?} could not start; overlay left idle", phase);
            self.fade = None;
            return;
        };
        self.tweens.to(id, [level; 3], self.config.fade_duration.as_secs_f32(), self.config.ease);
        self.tweens.start(id);
        self.fade = Some(Fade { id, phase });
        debug!("Pause arrow {:?} towards {}", phase, level);
    }

    // true if a fade was running
    fn cancel_fade(&mut self) -> bool {
        match self.fade.take() {
            Some(f) => {
                self.tweens.stop(f.id);
                self.tweens.remove(f.id);
                true
            }
            None => false,
        }
    }
}

impl<S: SurfaceProvider, T: TweenFactory> Drop for PauseOverlay<S, T> {
    fn drop(&mut self) {
        self.cancel_fade();
    }
}
