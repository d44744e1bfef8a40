use log::{error, info, LevelFilter};
use pause_overlay::config::{
    DEMO_FRAME_RATE, DEMO_PAUSED_SECONDS, DEMO_SAVE_EVERY_FRAMES, DEMO_WINDOW_HEIGHT, DEMO_WINDOW_WIDTH,
};
use pause_overlay::{
    Canvas, DrawContext, OverlayConfig, OverlayError, PauseOverlay, Stage, SurfaceProvider, TweenManager,
};
use std::cell::RefCell;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// Stand-in for whatever the game had on screen when it lost focus.
fn draw_scene(ctx: &mut impl DrawContext) -> Result<(), OverlayError> {
    let (w, h) = (ctx.width() as f32, ctx.height() as f32);
    ctx.set_fill_style("#0a141b")?;
    ctx.fill_rect(0.0, 0.0, w, h);

    let palette = ["#ff5d47", "#ff47b3", "#8885ff", "#00b8cc", "#5ce087", "#ffbe00"];
    let bar_w = w / palette.len() as f32;
    for (i, hex) in palette.iter().enumerate() {
        ctx.set_fill_style(hex)?;
        let bar_h = h * (0.25 + 0.1 * i as f32);
        ctx.fill_rect(i as f32 * bar_w + 8.0, h - bar_h, bar_w - 16.0, bar_h);
    }

    ctx.set_fill_style("rgba(255, 255, 255, 0.5)")?;
    ctx.fill_rect(0.0, 0.0, w, 0.08 * h);
    Ok(())
}

fn save_frame(stage: &Stage, dir: &Path, frame: u32) -> Result<(), Box<dyn Error>> {
    let path = dir.join(format!("frame_{:03}.png", frame));
    let img = stage
        .with_surface(|c| c.image().clone())
        .ok_or(OverlayError::HostSurfaceUnavailable)?;
    img.save(&path)?;
    info!("Wrote {:?}", path);
    Ok(())
}

fn run(out_dir: PathBuf, config: OverlayConfig) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(&out_dir)?;

    let stage = Stage::new(Canvas::new(DEMO_WINDOW_WIDTH, DEMO_WINDOW_HEIGHT)?);
    let tweens = Rc::new(RefCell::new(TweenManager::new()));
    let mut overlay = PauseOverlay::new(stage.clone(), tweens.clone(), config, DEMO_WINDOW_WIDTH, DEMO_WINDOW_HEIGHT)?;

    stage
        .with_surface(|c| draw_scene(c))
        .ok_or(OverlayError::HostSurfaceUnavailable)??;
    info!("Stage ready: {:?}", stage.size());
    save_frame(&stage, &out_dir, 0)?;

    overlay.on_paused()?;

    let dt = 1.0 / DEMO_FRAME_RATE;
    let frames = (DEMO_PAUSED_SECONDS * DEMO_FRAME_RATE).round() as u32;
    for frame in 1..=frames {
        let events = tweens.borrow_mut().update(dt);
        for ev in &events {
            overlay.handle_tween_event(ev);
        }
        overlay.update();
        overlay.render()?;
        if frame % DEMO_SAVE_EVERY_FRAMES == 0 {
            info!("Frame {}: arrow {}", frame, overlay.arrow_fill_style());
            save_frame(&stage, &out_dir, frame)?;
        }
    }

    overlay.on_resume();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("pause_overlay::ui::anim", LevelFilter::Warn) // per-tween chatter
        .init();

    let mut args = std::env::args().skip(1);
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("pause_frames"));
    let config = match args.next() {
        Some(path) => OverlayConfig::load(Path::new(&path))?,
        None => OverlayConfig::default(),
    };

    info!("Pause overlay demo starting...");
    if let Err(e) = run(out_dir, config) {
        error!("Demo exited with error: {}", e);
        return Err(e);
    }
    info!("Demo finished.");
    Ok(())
}
