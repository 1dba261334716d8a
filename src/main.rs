mod cli;
mod config;
mod error;
mod input;
mod logging;
mod overlay;
mod renderer;
mod solver;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use error::AppError;
use solver::{diagnostics, DragEvent, SolverParams};
use state::{FrameSnapshot, Grid, SimState};

struct Defaults;

impl Defaults {
    const TITLE: &'static str = "pressureflow";
    /// Frames per full turn of the scripted headless stir.
    const HEADLESS_STIR_PERIOD: usize = 240;
    /// Headless diagnostics are logged every this many frames.
    const HEADLESS_LOG_INTERVAL: u64 = 60;
    /// Pause after a skipped frame before trying again.
    const SKIP_BACKOFF_MS: u64 = 16;
}

fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

struct PhysicsChannels {
    drag_tx: mpsc::Sender<DragEvent>,
    param_tx: mpsc::Sender<SolverParams>,
    clear_tx: mpsc::Sender<()>,
    snap_rx: mpsc::Receiver<FrameSnapshot>,
    snap_return_tx: mpsc::Sender<FrameSnapshot>,
}

/// Run the frame loop on its own thread.
///
/// Drag events and parameter changes are applied between frames, never during one.
fn spawn_physics_thread(
    grid: Grid,
    params: SolverParams,
    running: Arc<AtomicBool>,
) -> (PhysicsChannels, std::thread::JoinHandle<()>) {
    let (drag_tx, drag_rx) = mpsc::channel::<DragEvent>();
    let (param_tx, param_rx) = mpsc::channel::<SolverParams>();
    let (clear_tx, clear_rx) = mpsc::channel::<()>();
    let (snap_tx, snap_rx) = mpsc::sync_channel::<FrameSnapshot>(1);
    let (snap_return_tx, snap_return_rx) = mpsc::channel::<FrameSnapshot>();

    let handle = std::thread::spawn(move || {
        let mut sim = SimState::new(grid);
        let mut params = params;
        let mut snap_buf = FrameSnapshot::new_empty(grid);
        log::debug!("physics thread started on {}x{}", grid.width, grid.height);

        while running.load(Ordering::SeqCst) {
            if clear_rx.try_iter().count() > 0 {
                sim.clear();
            }
            while let Ok(new_params) = param_rx.try_recv() {
                params = new_params;
            }
            for event in drag_rx.try_iter() {
                solver::inject(&mut sim, &event, &params.forcing);
            }

            let stats = match solver::fluid_step(&mut sim, &params) {
                Ok(stats) => stats,
                Err(e) => {
                    log::warn!("frame {} skipped: {e}", sim.frame + 1);
                    std::thread::sleep(Duration::from_millis(Defaults::SKIP_BACKOFF_MS));
                    continue;
                }
            };
            log::trace!(
                "frame {} | k={} | div={:.6}",
                stats.frame,
                stats.iterations,
                stats.mean_divergence
            );

            sim.snapshot_into(&mut snap_buf, stats);
            if snap_tx.send(snap_buf).is_err() {
                break;
            }
            snap_buf = snap_return_rx
                .try_recv()
                .ok()
                .filter(|b| b.grid == grid)
                .unwrap_or_else(|| FrameSnapshot::new_empty(grid));
        }
        log::debug!("physics thread stopped at frame {}", sim.frame);
    });

    let channels = PhysicsChannels { drag_tx, param_tx, clear_tx, snap_rx, snap_return_tx };
    (channels, handle)
}

fn format_status(
    params: &SolverParams,
    snap: Option<&FrameSnapshot>,
    panel_visible: bool,
    viz_mode: renderer::VizMode,
    colormap: renderer::ColorMap,
) -> String {
    if panel_visible {
        return "space=close  ud=nav  lr=adj  ,.=fine  r=reset  c=clear".to_string();
    }
    let frame = match snap {
        Some(s) => {
            let (lo, hi) = diagnostics::pressure_range(&s.pressure);
            format!(
                "f={} div={:.4} p=[{:.2} {:.2}]",
                s.frame, s.stats.mean_divergence, lo, hi
            )
        }
        None => "f=0".to_string(),
    };
    format!(
        "k={} w={:.5} lim={:.2} | {frame} | {} {} | space=params v=viz m=color c=clear",
        params.relax_iterations,
        params.relax_coefficient,
        params.field_limit,
        viz_mode.label(),
        colormap.label(),
    )
}

fn main() {
    if let Err(e) = run(std::env::args().skip(1)) {
        // No-op when the configured logger is already installed.
        logging::init_logging(None);
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: impl IntoIterator<Item = String>) -> Result<(), AppError> {
    let args = cli::parse_args(args)?;
    let cfg = config::load(args.config.as_deref())?;
    logging::init_logging(cfg.log_level.as_deref());

    let grid = cfg.grid()?;
    let params = cfg.solver_params()?;
    log::info!(
        "grid {}x{} ({:?}) | k={} omega={} limit={} | tolerance={:?}",
        grid.width,
        grid.height,
        params.addressing,
        params.relax_iterations,
        params.relax_coefficient,
        params.field_limit,
        params.tolerance,
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    match args.headless {
        Some(frames) => {
            run_headless(grid, &params, frames, &running);
            Ok(())
        }
        None => run_gui(&cfg, grid, params, running),
    }
}

fn log_diagnostics(sim: &SimState, params: &SolverParams, stats: &solver::FrameStats) {
    let v = sim.velocity.front();
    let (lo, hi) = diagnostics::pressure_range(&sim.pressure.front().values);
    log::info!(
        "frame {} | k={} | div {:.6} -> {:.6} | ke={:.6} | p=[{:.4}, {:.4}]",
        stats.frame,
        stats.iterations,
        stats.mean_divergence,
        diagnostics::mean_abs_divergence(sim.grid, v, params.addressing),
        diagnostics::kinetic_energy(&v.vx, &v.vy),
        lo,
        hi,
    );
}

/// Drive the solver without a window, stirring along a fixed circle.
fn run_headless(grid: Grid, params: &SolverParams, frames: usize, running: &AtomicBool) {
    log::info!("headless run: {frames} frames");
    let mut sim = SimState::new(grid);
    let mut stir = input::StirPath::new(grid, Defaults::HEADLESS_STIR_PERIOD);
    let mut skipped = 0usize;
    let start = Instant::now();

    for _ in 0..frames {
        if !running.load(Ordering::SeqCst) {
            log::info!("interrupted");
            break;
        }
        solver::inject(&mut sim, &stir.next_event(), &params.forcing);
        match solver::fluid_step(&mut sim, params) {
            Ok(stats) if stats.frame % Defaults::HEADLESS_LOG_INTERVAL == 0 => {
                log_diagnostics(&sim, params, &stats);
            }
            Ok(stats) => {
                log::debug!("frame {} | k={} | div={:.6}", stats.frame, stats.iterations, stats.mean_divergence);
            }
            Err(e) => {
                skipped += 1;
                log::warn!("frame {} skipped: {e}", sim.frame + 1);
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = sim.frame as f64 / elapsed.as_secs_f64().max(1e-9);
    log::info!(
        "headless run done: {} frames in {:.2?} ({rate:.1} frames/s), {skipped} skipped",
        sim.frame,
        elapsed,
    );
}

fn run_gui(
    cfg: &config::Config,
    grid: Grid,
    params: SolverParams,
    running: Arc<AtomicBool>,
) -> Result<(), AppError> {
    let startup_params = params.clone();
    let mut current_params = params;
    let mut viz_mode = renderer::VizMode::Pressure;
    let mut colormap = cfg.display.colormap;
    let mut status_text = format_status(&current_params, None, false, viz_mode, colormap);

    let mut render_cfg = renderer::RenderConfig::fit(cfg.display.width, cfg.display.height, grid);
    let mut w = render_cfg.frame_width;
    let mut h = render_cfg.frame_height;

    let mut window = Window::new(
        Defaults::TITLE,
        w,
        h,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(cfg.display.target_fps);

    let (channels, physics_thread) = spawn_physics_thread(grid, current_params.clone(), running.clone());
    let PhysicsChannels { drag_tx, param_tx, clear_tx, snap_rx, snap_return_tx } = channels;

    let mut overlay_state = overlay::OverlayState::new();
    let mut drag = input::DragTracker::new();

    let mut framebuf = vec![0u32; w * h];
    let mut rgba_buf: Vec<u8> = Vec::new();
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();
    let mut last_snap: Option<FrameSnapshot> = None;
    let mut needs_redraw = false;

    while window.is_open() && running.load(Ordering::SeqCst) {
        // --- Keyboard handling ---

        // Escape: close panel first, then quit
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            if overlay_state.visible {
                overlay_state.visible = false;
                needs_redraw = true;
            } else {
                break;
            }
        }

        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            overlay_state.toggle();
            needs_redraw = true;
        }

        if overlay_state.visible {
            if window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
                overlay_state.navigate(-1);
                needs_redraw = true;
            }
            if window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
                overlay_state.navigate(1);
                needs_redraw = true;
            }

            // Left/Right: normal step, Comma/Period: fine step
            let steps = [
                (Key::Left, -1, false),
                (Key::Right, 1, false),
                (Key::Comma, -1, true),
                (Key::Period, 1, true),
            ];
            for (key, delta, fine) in steps {
                if window.is_key_pressed(key, KeyRepeat::Yes)
                    && overlay::adjust_param(&mut current_params, overlay_state.selected, delta, fine)
                {
                    let _ = param_tx.send(current_params.clone());
                    needs_redraw = true;
                }
            }

            // R: reset selected parameter to its startup value
            if window.is_key_pressed(Key::R, KeyRepeat::No) {
                overlay::reset_param(&mut current_params, &startup_params, overlay_state.selected);
                let _ = param_tx.send(current_params.clone());
                needs_redraw = true;
            }
        }

        // C: zero velocity and pressure
        if window.is_key_pressed(Key::C, KeyRepeat::No) {
            let _ = clear_tx.send(());
            log::info!("fields cleared");
        }

        if window.is_key_pressed(Key::V, KeyRepeat::No) {
            viz_mode = viz_mode.next();
            needs_redraw = true;
        }

        if window.is_key_pressed(Key::M, KeyRepeat::No) {
            colormap = colormap.next();
            needs_redraw = true;
        }

        // --- Pointer: drags become forcing events ---
        let mouse = window.get_mouse_pos(MouseMode::Discard);
        let down = window.get_mouse_down(MouseButton::Left) && !overlay_state.visible;
        let was_dragging = drag.is_dragging();
        if let Some(event) = drag.update(&render_cfg, mouse, down) {
            let _ = drag_tx.send(event);
        }
        if drag.is_dragging() != was_dragging {
            log::debug!("stroke {}", if was_dragging { "ended" } else { "started" });
        }

        // --- Check for window resize ---
        let (new_w, new_h) = window.get_size();
        if new_w != w || new_h != h {
            render_cfg = renderer::RenderConfig::fit(
                new_w,
                new_h.saturating_sub(renderer::STATUS_BAR_HEIGHT),
                grid,
            );
            w = render_cfg.frame_width;
            h = render_cfg.frame_height;
            framebuf = vec![0u32; w * h];
            needs_redraw = true;
        }

        // --- Non-blocking: grab latest snapshot if available ---
        let mut snap = None;
        while let Ok(s) = snap_rx.try_recv() {
            if let Some(old) = snap.replace(s) {
                let _ = snap_return_tx.send(old);
            }
        }

        if let Some(s) = snap {
            if let Some(old) = last_snap.replace(s) {
                let _ = snap_return_tx.send(old);
            }
            needs_redraw = true;
        }

        if needs_redraw {
            if let Some(ref s) = last_snap {
                status_text = format_status(&current_params, Some(s), overlay_state.visible, viz_mode, colormap);
                renderer::render_into(&mut rgba_buf, s, &render_cfg, viz_mode, colormap);
                renderer::render_status(&mut rgba_buf, &render_cfg, &status_text);
                overlay::render_overlay(&mut rgba_buf, &render_cfg, &overlay_state, &current_params, &startup_params);
                rgba_to_argb(&rgba_buf, &mut framebuf);
            }
            needs_redraw = false;
        }

        window.update_with_buffer(&framebuf, w, h)?;

        frame_count += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let display_fps = frame_count;
            frame_count = 0;
            last_fps_time = now;
            window.set_title(&format!("{} - {display_fps} fps", Defaults::TITLE));
        }
    }

    // Shutdown
    log::debug!("status at exit: {status_text}");
    running.store(false, Ordering::SeqCst);
    drop(snap_rx);
    let _ = physics_thread.join();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_argb_drops_alpha() {
        let rgba = [0x11, 0x22, 0x33, 0xFF, 0xAA, 0xBB, 0xCC, 0x00];
        let mut out = [0u32; 2];
        rgba_to_argb(&rgba, &mut out);
        assert_eq!(out, [0x112233, 0xAABBCC]);
    }

    #[test]
    fn test_format_status_panel_hints() {
        let grid = Grid::new(8, 8).unwrap();
        let params = SolverParams::for_grid(grid);
        let text = format_status(&params, None, true, renderer::VizMode::Pressure, renderer::ColorMap::Grayscale);
        assert!(text.contains("r=reset"), "panel hints expected: {text}");
    }

    #[test]
    fn test_format_status_reports_frame() {
        let grid = Grid::new(8, 8).unwrap();
        let params = SolverParams::for_grid(grid);
        let mut snap = FrameSnapshot::new_empty(grid);
        snap.frame = 42;
        snap.pressure[3] = 0.5;
        let text = format_status(&params, Some(&snap), false, renderer::VizMode::Pressure, renderer::ColorMap::Grayscale);
        assert!(text.starts_with("k=4 w=0.25175"), "params first: {text}");
        assert!(text.contains("f=42"), "{text}");
        assert!(text.contains("p=[0.00 0.50]"), "{text}");
    }

    #[test]
    fn test_physics_thread_applies_drags_between_frames() {
        let grid = Grid::new(32, 32).unwrap();
        let params = SolverParams::for_grid(grid);
        let running = Arc::new(AtomicBool::new(true));
        let (channels, handle) = spawn_physics_thread(grid, params, running.clone());

        channels.drag_tx.send(DragEvent::new((12.0, 16.0), (18.0, 16.0))).unwrap();
        let mut stirred = false;
        for _ in 0..50 {
            let snap = channels.snap_rx.recv_timeout(Duration::from_secs(5)).unwrap();
            stirred |= snap.vx.iter().any(|&v| v > 0.0);
            let _ = channels.snap_return_tx.send(snap);
            if stirred {
                break;
            }
        }
        assert!(stirred, "drag should reach the velocity field");

        channels.clear_tx.send(()).unwrap();
        running.store(false, Ordering::SeqCst);
        drop(channels);
        handle.join().unwrap();
    }
}
