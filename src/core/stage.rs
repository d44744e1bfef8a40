// src/core/stage.rs
use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::core::canvas::{Canvas, DrawContext};

/// Gives components temporary access to the host's live surface.
///
/// Returns `None` when no surface is attached (or it is already in use),
/// which components report as a missing host surface.
pub trait SurfaceProvider {
    type Surface: DrawContext;

    fn with_surface<R>(&self, f: impl FnOnce(&mut Self::Surface) -> R) -> Option<R>;
}

/// Shared handle to the stage's live canvas. Clones point at the same surface.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    canvas: Rc<RefCell<Option<Canvas>>>,
}

impl Stage {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas: Rc::new(RefCell::new(Some(canvas))) }
    }

    /// A stage with no surface yet.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn attach(&self, canvas: Canvas) {
        debug!("Stage surface attached ({}x{})", canvas.width(), canvas.height());
        *self.canvas.borrow_mut() = Some(canvas);
    }

    pub fn detach(&self) -> Option<Canvas> {
        debug!("Stage surface detached");
        self.canvas.borrow_mut().take()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.canvas.borrow().as_ref().map(|c| (c.width(), c.height()))
    }
}

impl SurfaceProvider for Stage {
    type Surface = Canvas;

    fn with_surface<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> Option<R> {
        let Ok(mut slot) = self.canvas.try_borrow_mut() else {
            warn!("Stage surface requested while already borrowed");
            return None;
        };
        slot.as_mut().map(f)
    }
}
