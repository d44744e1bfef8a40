use std::path::Path;
use std::time::Duration;

use configparser::ini::Ini;
use log::{info, warn};

use crate::error::OverlayError;
use crate::ui::anim::Ease;

// Surfaces
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

// Demo window
pub const DEMO_WINDOW_WIDTH: u32 = 800;
pub const DEMO_WINDOW_HEIGHT: u32 = 600;
pub const DEMO_FRAME_RATE: f32 = 60.0;
pub const DEMO_PAUSED_SECONDS: f32 = 2.5;
pub const DEMO_SAVE_EVERY_FRAMES: u32 = 30;

// Pause overlay
pub const FADE_DURATION: Duration = Duration::from_millis(1000);
pub const DIM_ALPHA: f32 = 0.4;    // black wash over the freeze-frame
pub const ARROW_ALPHA: f32 = 0.8;
pub const PULSE_LOW: f32 = 50.0;   // darkest arrow grey
pub const PULSE_HIGH: f32 = 255.0;

pub const CONFIG_SECTION: &str = "PauseOverlay";

/// Tunables for the pause overlay; `Default` is the stock look.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    pub fade_duration: Duration,
    pub dim_alpha: f32,
    pub arrow_alpha: f32,
    pub pulse_low: f32,
    pub pulse_high: f32,
    pub ease: Ease,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_duration: FADE_DURATION,
            dim_alpha: DIM_ALPHA,
            arrow_alpha: ARROW_ALPHA,
            pulse_low: PULSE_LOW,
            pulse_high: PULSE_HIGH,
            ease: Ease::Linear,
        }
    }
}

impl OverlayConfig {
    /// Reads `[PauseOverlay]` overrides from an ini file. Missing keys keep defaults.
    pub fn load(path: &Path) -> Result<Self, OverlayError> {
        let mut ini = Ini::new_cs();
        ini.load(path)
            .map_err(|e| OverlayError::Config(format!("{:?}: {}", path, e)))?;
        info!("Loaded overlay config from {:?}", path);
        Self::from_ini(&ini)
    }

    pub fn from_ini_str(text: &str) -> Result<Self, OverlayError> {
        let mut ini = Ini::new_cs();
        ini.read(text.to_string()).map_err(OverlayError::Config)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, OverlayError> {
        let mut cfg = Self::default();
        let float = |key: &str| -> Result<Option<f32>, OverlayError> {
            ini.getfloat(CONFIG_SECTION, key)
                .map(|v| v.map(|f| f as f32))
                .map_err(|e| OverlayError::Config(format!("{}: {}", key, e)))
        };

        if let Some(ms) = ini
            .getuint(CONFIG_SECTION, "FadeDurationMs")
            .map_err(|e| OverlayError::Config(format!("FadeDurationMs: {}", e)))?
        {
            cfg.fade_duration = Duration::from_millis(ms);
        }
        if let Some(a) = float("DimAlpha")? { cfg.dim_alpha = unit_alpha("DimAlpha", a)?; }
        if let Some(a) = float("ArrowAlpha")? { cfg.arrow_alpha = unit_alpha("ArrowAlpha", a)?; }
        if let Some(v) = float("PulseLow")? { cfg.pulse_low = channel("PulseLow", v)?; }
        if let Some(v) = float("PulseHigh")? { cfg.pulse_high = channel("PulseHigh", v)?; }
        if let Some(name) = ini.get(CONFIG_SECTION, "Easing") {
            cfg.ease = name.parse()?;
        }

        if cfg.pulse_low > cfg.pulse_high {
            warn!("PulseLow ({}) above PulseHigh ({}); the arrow will pulse inverted.", cfg.pulse_low, cfg.pulse_high);
        }
        Ok(cfg)
    }
}

fn unit_alpha(key: &str, v: f32) -> Result<f32, OverlayError> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(OverlayError::Config(format!("{} must be within 0..=1, got {}", key, v)))
    }
}

fn channel(key: &str, v: f32) -> Result<f32, OverlayError> {
    if (0.0..=255.0).contains(&v) {
        Ok(v)
    } else {
        Err(OverlayError::Config(format!("{} must be within 0..=255, got {}", key, v)))
    }
}
