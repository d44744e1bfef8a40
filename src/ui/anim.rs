// src/ui/anim.rs
//! Colour tweens with a tiny registry, driven once per frame by the host.
//!
//! Usage sketch:
//! ```ignore
//! use crate::ui::anim::*;
//!
//! let mut tweens = TweenManager::new();
//! let id = tweens.create([255.0, 255.0, 255.0]).unwrap();
//! tweens.to(id, [50.0, 50.0, 50.0], 1.0, Ease::Linear);
//! tweens.start(id);
//!
//! // each frame
//! for ev in tweens.update(dt) {
//!     match ev {
//!         TweenEvent::Step { value, .. } => tint = value,
//!         TweenEvent::Completed { value, .. } => { tint = value; /* chain next leg */ }
//!     }
//! }
//! ```
//! Tweens never write into the caller's state; every step reports the
//! interpolated value and the owner assigns it. Completed tweens are
//! retired from the registry.
use log::{debug, trace, warn};
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::OverlayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Ease {
    /// StepMania: `linear(t)`
    #[default]
    Linear,
    /// StepMania: `accelerate(t)` (quad-in)
    Accelerate,
    /// StepMania: `decelerate(t)` (quad-out)
    Decelerate,
}

pub fn ease_apply(e: Ease, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Ease::Linear => t,
        Ease::Accelerate => t * t,
        Ease::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
    }
}

impl FromStr for Ease {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "none" => Ok(Ease::Linear),
            "accelerate" | "quadin" => Ok(Ease::Accelerate),
            "decelerate" | "quadout" => Ok(Ease::Decelerate),
            other => Err(OverlayError::Config(format!("unknown easing '{}'", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenEvent {
    Step { id: TweenId, value: [f32; 3] },
    /// Emitted once, carrying the exact target.
    Completed { id: TweenId, value: [f32; 3] },
}

impl TweenEvent {
    pub fn id(&self) -> TweenId {
        match *self {
            TweenEvent::Step { id, .. } | TweenEvent::Completed { id, .. } => id,
        }
    }

    pub fn value(&self) -> [f32; 3] {
        match *self {
            TweenEvent::Step { value, .. } | TweenEvent::Completed { value, .. } => value,
        }
    }
}

/// The tween facility a component animates through.
///
/// Mirrors the usual create / to / start / stop / remove lifecycle;
/// completion is reported as a [`TweenEvent::Completed`] instead of a
/// callback.
pub trait TweenFactory {
    /// `None` when the facility cannot take new tweens right now.
    fn create(&mut self, from: [f32; 3]) -> Option<TweenId>;
    fn to(&mut self, id: TweenId, target: [f32; 3], duration: f32, ease: Ease);
    fn start(&mut self, id: TweenId);
    fn stop(&mut self, id: TweenId);
    fn remove(&mut self, id: TweenId);
}

const FINISH_SLACK: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Stopped,
}

#[derive(Clone, Debug)]
struct Tween {
    from: [f32; 3],
    to: [f32; 3],
    ease: Ease,
    dur: f32,
    elapsed: f32,
    phase: Phase,
}

impl Tween {
    #[inline(always)]
    fn lerp(&self, a: f32) -> [f32; 3] {
        let mut out = [0.0; 3];
        for i in 0..3 { out[i] = self.from[i] + (self.to[i] - self.from[i]) * a; }
        out
    }

    // returns true if finished
    fn advance(&mut self, dt: f32) -> bool {
        if self.dur == 0.0 {
            self.elapsed = 0.0;
            return true;
        }
        self.elapsed = (self.elapsed + dt).min(self.dur);
        // per-frame f32 steps land a hair short of `dur`
        if self.dur - self.elapsed <= FINISH_SLACK {
            self.elapsed = self.dur;
            return true;
        }
        false
    }
}

#[derive(Debug, Default)]
pub struct TweenManager {
    tweens: BTreeMap<TweenId, Tween>,
    next_id: u64,
}

impl TweenManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn contains(&self, id: TweenId) -> bool {
        self.tweens.contains_key(&id)
    }

    pub fn is_running(&self, id: TweenId) -> bool {
        self.tweens.get(&id).is_some_and(|t| t.phase == Phase::Running)
    }

    pub fn running_count(&self) -> usize {
        self.tweens.values().filter(|t| t.phase == Phase::Running).count()
    }

    /// Advances every running tween by `dt` seconds, in creation order.
    pub fn update(&mut self, dt: f32) -> Vec<TweenEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();
        let mut finished = Vec::new();
        for (&id, tw) in self.tweens.iter_mut() {
            if tw.phase != Phase::Running {
                continue;
            }
            if tw.advance(dt) {
                trace!("Tween {:?} completed at {:?}", id, tw.to);
                events.push(TweenEvent::Completed { id, value: tw.to });
                finished.push(id);
            } else {
                let a = ease_apply(tw.ease, tw.elapsed / tw.dur);
                events.push(TweenEvent::Step { id, value: tw.lerp(a) });
            }
        }
        for id in finished {
            self.tweens.remove(&id);
        }
        events
    }
}

impl TweenFactory for TweenManager {
    fn create(&mut self, from: [f32; 3]) -> Option<TweenId> {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.insert(id, Tween {
            from,
            to: from,
            ease: Ease::Linear,
            dur: 0.0,
            elapsed: 0.0,
            phase: Phase::Pending,
        });
        Some(id)
    }

    fn to(&mut self, id: TweenId, target: [f32; 3], duration: f32, ease: Ease) {
        if let Some(tw) = self.tweens.get_mut(&id) {
            tw.to = target;
            tw.dur = duration.max(0.0);
            tw.ease = ease;
        }
    }

    fn start(&mut self, id: TweenId) {
        if let Some(tw) = self.tweens.get_mut(&id) {
            tw.elapsed = 0.0;
            tw.phase = Phase::Running;
            debug!("Tween {:?} started: {:?} -> {:?} over {:.3}s ({:?})", id, tw.from, tw.to, tw.dur, tw.ease);
        }
    }

    fn stop(&mut self, id: TweenId) {
        if let Some(tw) = self.tweens.get_mut(&id) {
            tw.phase = Phase::Stopped;
        }
    }

    fn remove(&mut self, id: TweenId) {
        self.tweens.remove(&id);
    }
}

// Host loops often forward events while still holding the manager
// (`for ev in tweens.borrow_mut().update(dt)`), so access never panics.
fn try_manager<'a, T>(cell: &'a RefCell<T>, op: &str) -> Option<RefMut<'a, T>> {
    let m = cell.try_borrow_mut().ok();
    if m.is_none() {
        warn!("Tween manager already borrowed; {} skipped", op);
    }
    m
}

// Shared between the host loop (which calls `update`) and its components.
impl<T: TweenFactory> TweenFactory for Rc<RefCell<T>> {
    fn create(&mut self, from: [f32; 3]) -> Option<TweenId> {
        try_manager(self, "create")?.create(from)
    }
    fn to(&mut self, id: TweenId, target: [f32; 3], duration: f32, ease: Ease) {
        if let Some(mut m) = try_manager(self, "to") { m.to(id, target, duration, ease) }
    }
    fn start(&mut self, id: TweenId) {
        if let Some(mut m) = try_manager(self, "start") { m.start(id) }
    }
    fn stop(&mut self, id: TweenId) {
        if let Some(mut m) = try_manager(self, "stop") { m.stop(id) }
    }
    fn remove(&mut self, id: TweenId) {
        if let Some(mut m) = try_manager(self, "remove") { m.remove(id) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(m: &mut TweenManager, from: [f32; 3], to: [f32; 3], dur: f32) -> TweenId {
        let id = m.create(from).unwrap();
        m.to(id, to, dur, Ease::Linear);
        m.start(id);
        id
    }

    #[test]
    fn easing_curves_hit_endpoints_and_clamp() {
        for e in [Ease::Linear, Ease::Accelerate, Ease::Decelerate] {
            assert_eq!(ease_apply(e, 0.0), 0.0);
            assert_eq!(ease_apply(e, 1.0), 1.0);
            assert_eq!(ease_apply(e, 2.0), 1.0);
            assert_eq!(ease_apply(e, -1.0), 0.0);
        }
        assert_eq!(ease_apply(Ease::Linear, 0.25), 0.25);
        assert_eq!(ease_apply(Ease::Accelerate, 0.5), 0.25);
        assert_eq!(ease_apply(Ease::Decelerate, 0.5), 0.75);
    }

    #[test]
    fn ease_names_parse() {
        assert_eq!("Linear".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!(" decelerate ".parse::<Ease>().unwrap(), Ease::Decelerate);
        assert!("bounce".parse::<Ease>().is_err());
    }

    #[test]
    fn pending_tween_does_not_advance() {
        let mut m = TweenManager::new();
        let id = m.create([0.0; 3]).unwrap();
        m.to(id, [100.0; 3], 1.0, Ease::Linear);
        assert!(m.update(0.5).is_empty());
        assert!(!m.is_running(id));
    }

    #[test]
    fn linear_tween_steps_then_completes_once() {
        let mut m = TweenManager::new();
        let id = started(&mut m, [255.0; 3], [55.0; 3], 1.0);

        let ev = m.update(0.25);
        assert_eq!(ev, vec![TweenEvent::Step { id, value: [205.0; 3] }]);

        let ev = m.update(0.5);
        assert_eq!(ev, vec![TweenEvent::Step { id, value: [105.0; 3] }]);

        let ev = m.update(10.0);
        assert_eq!(ev, vec![TweenEvent::Completed { id, value: [55.0; 3] }]);
        assert!(m.update(1.0).is_empty());
        assert!(!m.is_running(id));
        assert!(!m.contains(id));
    }

    #[test]
    fn sixty_frame_steps_finish_a_one_second_tween() {
        let mut m = TweenManager::new();
        let id = started(&mut m, [0.0; 3], [60.0; 3], 1.0);
        for frame in 1..=59 {
            let ev = m.update(1.0 / 60.0);
            assert!(matches!(ev[..], [TweenEvent::Step { .. }]), "frame {frame}: {ev:?}");
        }
        assert_eq!(m.update(1.0 / 60.0), vec![TweenEvent::Completed { id, value: [60.0; 3] }]);
    }

    #[test]
    fn zero_duration_completes_on_first_update() {
        let mut m = TweenManager::new();
        let id = started(&mut m, [0.0; 3], [9.0; 3], 0.0);
        assert_eq!(m.update(0.0), vec![TweenEvent::Completed { id, value: [9.0; 3] }]);
    }

    #[test]
    fn stop_and_remove_silence_a_tween() {
        let mut m = TweenManager::new();
        let a = started(&mut m, [0.0; 3], [10.0; 3], 1.0);
        let b = started(&mut m, [0.0; 3], [10.0; 3], 1.0);
        m.stop(a);
        assert_eq!(m.running_count(), 1);
        let ev = m.update(0.1);
        assert_eq!(ev.len(), 1);
        assert_eq!(ev[0].id(), b);
        m.remove(a);
        m.remove(b);
        assert!(m.is_empty());
        // unknown ids are ignored
        m.stop(a);
        m.remove(a);
    }

    #[test]
    fn shared_handle_drives_the_same_registry() {
        let shared = Rc::new(RefCell::new(TweenManager::new()));
        let mut handle = shared.clone();
        let id = handle.create([0.0; 3]).unwrap();
        handle.to(id, [1.0; 3], 1.0, Ease::Linear);
        handle.start(id);
        assert!(shared.borrow().is_running(id));
        assert_eq!(shared.borrow_mut().update(1.0)[0].value(), [1.0; 3]);
    }

    #[test]
    fn shared_handle_skips_work_while_borrowed() {
        let shared = Rc::new(RefCell::new(TweenManager::new()));
        let mut handle = shared.clone();
        let id = handle.create([0.0; 3]).unwrap();

        let guard = shared.borrow_mut();
        assert_eq!(handle.create([0.0; 3]), None);
        handle.to(id, [1.0; 3], 1.0, Ease::Linear);
        handle.start(id);
        handle.remove(id);
        drop(guard);

        assert!(shared.borrow().contains(id));
        assert!(!shared.borrow().is_running(id));
    }
}
