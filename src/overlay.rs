use crate::renderer::{self, RenderConfig, FONT_HEIGHT};
use crate::solver::SolverParams;

/// Number of adjustable parameters.
const PARAM_COUNT: usize = 7;

/// Gauge width in glyph cells.
const GAUGE_WIDTH: usize = 8;

/// Overlay panel state.
pub struct OverlayState {
    pub visible: bool,
    pub selected: usize,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            visible: false,
            selected: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn navigate(&mut self, delta: isize) {
        let count = PARAM_COUNT as isize;
        self.selected = ((self.selected as isize + delta).rem_euclid(count)) as usize;
    }
}

/// Definition of an adjustable parameter.
pub struct ParamDef {
    pub name: &'static str,
    pub short: &'static str,
    pub desc: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub fine_step: f64,
    /// Digits shown after the decimal point.
    pub decimals: usize,
    pub get: fn(&SolverParams) -> f64,
    pub set: fn(&mut SolverParams, f64),
}

/// All 7 adjustable parameters.
pub const PARAM_DEFS: [ParamDef; PARAM_COUNT] = [
    ParamDef {
        name: "iters",
        short: "jacobi k",
        desc: "pressure relaxation sweeps per frame",
        min: 1.0,
        max: 64.0,
        step: 1.0,
        fine_step: 1.0,
        decimals: 0,
        get: |p| p.relax_iterations as f64,
        set: |p, v| p.relax_iterations = v.round().max(1.0) as usize,
    },
    ParamDef {
        name: "omega",
        short: "relax w",
        desc: "jacobi weight, 0.25 is plain averaging",
        min: 0.2,
        max: 0.3,
        step: 0.005,
        fine_step: 0.00025,
        decimals: 5,
        get: |p| p.relax_coefficient,
        set: |p, v| p.relax_coefficient = v,
    },
    ParamDef {
        name: "limit",
        short: "saturate",
        desc: "velocity and pressure clamp",
        min: 0.1,
        max: 4.0,
        step: 0.1,
        fine_step: 0.01,
        decimals: 2,
        get: |p| p.field_limit,
        set: |p, v| p.field_limit = v,
    },
    ParamDef {
        name: "v.rad",
        short: "vel stamp",
        desc: "velocity stamp radius in cells",
        min: 0.5,
        max: 100.0,
        step: 1.0,
        fine_step: 0.1,
        decimals: 1,
        get: |p| p.forcing.velocity_radius,
        set: |p, v| p.forcing.velocity_radius = v,
    },
    ParamDef {
        name: "p.rad",
        short: "pres stamp",
        desc: "pressure stamp radius in cells",
        min: 0.5,
        max: 100.0,
        step: 1.0,
        fine_step: 0.1,
        decimals: 1,
        get: |p| p.forcing.pressure_radius,
        set: |p, v| p.forcing.pressure_radius = v,
    },
    ParamDef {
        name: "clamp",
        short: "drag clamp",
        desc: "drag distance that maps to full velocity",
        min: 0.1,
        max: 50.0,
        step: 0.5,
        fine_step: 0.1,
        decimals: 1,
        get: |p| p.forcing.delta_clamp,
        set: |p, v| p.forcing.delta_clamp = v,
    },
    ParamDef {
        name: "imp",
        short: "impulse",
        desc: "pressure stamped under the pointer",
        min: 0.0,
        max: 2.0,
        step: 0.05,
        fine_step: 0.01,
        decimals: 2,
        get: |p| p.forcing.pressure_impulse,
        set: |p, v| p.forcing.pressure_impulse = v,
    },
];

/// Adjust a parameter by delta steps (positive = increase, negative = decrease).
/// If `fine` is true, use fine_step instead of step.
/// Returns true if the value actually changed.
pub fn adjust_param(params: &mut SolverParams, selected: usize, delta: i32, fine: bool) -> bool {
    let def = &PARAM_DEFS[selected];
    let old = (def.get)(params);
    let step = if fine { def.fine_step } else { def.step };
    let new_val = (old + delta as f64 * step).clamp(def.min, def.max);
    (def.set)(params, new_val);
    ((def.get)(params) - old).abs() > f64::EPSILON
}

/// Reset a parameter to its startup value.
pub fn reset_param(params: &mut SolverParams, defaults: &SolverParams, selected: usize) {
    let def = &PARAM_DEFS[selected];
    (def.set)(params, (def.get)(defaults));
}

mod colors {
    pub const BORDER: [u8; 3] = [0x44, 0x44, 0x44];
    pub const HEADER: [u8; 3] = [0x00, 0xBB, 0xBB];
    pub const LABEL_NORMAL: [u8; 3] = [0x88, 0x88, 0x88];
    pub const LABEL_SELECTED: [u8; 3] = [0xFF, 0xFF, 0xFF];
    pub const VALUE: [u8; 3] = [0xCC, 0xCC, 0xCC];
    pub const DESC_NORMAL: [u8; 3] = [0x66, 0x66, 0x66];
    pub const DESC_SELECTED: [u8; 3] = [0xAA, 0xAA, 0xAA];
    pub const HINT: [u8; 3] = [0x44, 0x88, 0x88];
    pub const CURSOR: [u8; 3] = [0x00, 0xFF, 0xFF];
    pub const GAUGE_EMPTY: [u8; 3] = [0x22, 0x22, 0x22];
    pub const GAUGE_MARK: [u8; 3] = [0xEE, 0xEE, 0xEE];
}

/// Glyph cell used inside the panel: 5x7 scaled up to 7x9.
const CELL_W: usize = 7;
const CELL_H: usize = 9;
const CELL_STEP: usize = CELL_W + CELL_W / 5 + 1;
const ROW_H: usize = CELL_H + 4;
const PAD: usize = 10;
/// Widest row: cursor, name, gauge, value and short label.
const CONTENT_CHARS: usize = 36;
const HINTS: &str = "space=close  ud=nav  lr=adj  ,.=fine  r=reset  c=clear";

/// Pixel rectangle inside an RGBA frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl Rect {
    fn pixel<'a>(buf: &'a mut [u8], frame_width: usize, x: usize, y: usize) -> Option<&'a mut [u8]> {
        if x >= frame_width {
            return None;
        }
        let off = (y * frame_width + x) * 4;
        buf.get_mut(off..off + 4)
    }

    /// Scale the RGB of every covered pixel by `factor`.
    fn dim(&self, buf: &mut [u8], frame_width: usize, factor: f64) {
        for y in self.y..self.y + self.h {
            for x in self.x..self.x + self.w {
                if let Some(px) = Self::pixel(buf, frame_width, x, y) {
                    for c in &mut px[..3] {
                        *c = (*c as f64 * factor) as u8;
                    }
                }
            }
        }
    }

    fn fill(&self, buf: &mut [u8], frame_width: usize, color: [u8; 3]) {
        for y in self.y..self.y + self.h {
            for x in self.x..self.x + self.w {
                if let Some(px) = Self::pixel(buf, frame_width, x, y) {
                    px.copy_from_slice(&[color[0], color[1], color[2], 255]);
                }
            }
        }
    }

    /// 1px outline.
    fn outline(&self, buf: &mut [u8], frame_width: usize, color: [u8; 3]) {
        if self.w == 0 || self.h == 0 {
            return;
        }
        let (right, bottom) = (self.x + self.w - 1, self.y + self.h - 1);
        Rect { h: 1, ..*self }.fill(buf, frame_width, color);
        Rect { y: bottom, h: 1, ..*self }.fill(buf, frame_width, color);
        Rect { w: 1, ..*self }.fill(buf, frame_width, color);
        Rect { x: right, w: 1, ..*self }.fill(buf, frame_width, color);
    }
}

/// Where the panel goes: centered over the field, never over the status bar.
/// `None` when the window is too small to hold it.
fn panel_rect(cfg: &RenderConfig) -> Option<Rect> {
    let wanted_w = CONTENT_CHARS * CELL_STEP + PAD * 2;
    let wanted_h = PAD
        + ROW_H + 4                 // header
        + PARAM_COUNT * ROW_H + 6   // rows
        + ROW_H + 4                 // description
        + FONT_HEIGHT + 2           // hints
        + PAD;
    let area_w = cfg.frame_width;
    let area_h = cfg.status_y();
    let w = wanted_w.min(area_w.saturating_sub(4));
    let h = wanted_h.min(area_h.saturating_sub(4));
    if w < 2 || h < 2 {
        return None;
    }
    Some(Rect {
        x: (area_w - w) / 2,
        y: (area_h - h) / 2,
        w,
        h,
    })
}

/// Position of `value` inside the parameter's range, in [0, 1].
fn range_ratio(def: &ParamDef, value: f64) -> f64 {
    let span = def.max - def.min;
    if span.abs() <= f64::EPSILON {
        return 0.0;
    }
    ((value - def.min) / span).clamp(0.0, 1.0)
}

/// Teal gradient gauge with a tick at the startup value.
fn draw_gauge(buf: &mut [u8], frame_width: usize, area: Rect, ratio: f64, mark: f64) {
    area.fill(buf, frame_width, colors::GAUGE_EMPTY);
    let filled = ((ratio * area.w as f64).round() as usize).min(area.w);
    for dx in 0..filled {
        let t = dx as f64 / area.w as f64;
        let level = (0x55 as f64 + t * (0xCC - 0x55) as f64) as u8;
        Rect { x: area.x + dx, w: 1, ..area }.fill(buf, frame_width, [0, level, level]);
    }
    let mark_x = area.x + ((mark * area.w as f64) as usize).min(area.w.saturating_sub(1));
    Rect { x: mark_x, w: 1, ..area }.fill(buf, frame_width, colors::GAUGE_MARK);
}

/// Draw the parameter panel. Does nothing while hidden.
///
/// `startup` supplies the values marked on each gauge (what `r` resets to).
pub fn render_overlay(
    buf: &mut [u8],
    cfg: &RenderConfig,
    state: &OverlayState,
    params: &SolverParams,
    startup: &SolverParams,
) {
    if !state.visible {
        return;
    }
    let Some(panel) = panel_rect(cfg) else {
        return;
    };
    let fw = cfg.frame_width;
    panel.dim(buf, fw, 0.25);
    panel.outline(buf, fw, colors::BORDER);

    let left = panel.x + PAD;
    let mut cy = panel.y + PAD;
    let text = |buf: &mut [u8], x: usize, y: usize, s: &str, color: [u8; 3]| {
        renderer::draw_text_sized(buf, fw, x, y, s, color, CELL_W, CELL_H)
    };

    text(buf, left, cy, "solver parameters", colors::HEADER);
    cy += ROW_H + 4;

    for (i, def) in PARAM_DEFS.iter().enumerate() {
        let selected = i == state.selected;
        if selected {
            text(buf, left, cy, ">", colors::CURSOR);
        }
        let label = if selected { colors::LABEL_SELECTED } else { colors::LABEL_NORMAL };
        text(buf, left + 2 * CELL_STEP, cy, def.name, label);

        let value = (def.get)(params);
        let gauge = Rect {
            x: left + 8 * CELL_STEP,
            y: cy,
            w: GAUGE_WIDTH * CELL_STEP,
            h: CELL_H,
        };
        draw_gauge(buf, fw, gauge, range_ratio(def, value), range_ratio(def, (def.get)(startup)));

        let value_x = gauge.x + gauge.w + CELL_STEP;
        let end = text(buf, value_x, cy, &format!("{:.*}", def.decimals, value), colors::VALUE);
        let short = if selected { colors::DESC_SELECTED } else { colors::DESC_NORMAL };
        text(buf, end + CELL_STEP, cy, def.short, short);
        cy += ROW_H;
    }
    cy += 6;

    text(buf, left, cy, PARAM_DEFS[state.selected].desc, colors::DESC_SELECTED);
    cy += ROW_H + 4;

    // Hints at native size, one step down in the hierarchy.
    renderer::draw_text(buf, fw, left, cy, HINTS, colors::HINT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RenderConfig, FONT_HEIGHT, FONT_WIDTH};
    use crate::solver::SolverParams;
    use crate::state::Grid;

    const CHAR_STEP: usize = FONT_WIDTH + 1;

    fn test_config() -> RenderConfig {
        RenderConfig::fit(542, 512, Grid::new(64, 64).unwrap())
    }

    #[test]
    fn test_overlay_toggle() {
        let mut state = OverlayState::new();
        assert!(!state.visible);
        state.toggle();
        assert!(state.visible);
        state.toggle();
        assert!(!state.visible);
    }

    #[test]
    fn test_navigate_wraps() {
        let mut state = OverlayState::new();
        assert_eq!(state.selected, 0);
        state.navigate(-1);
        assert_eq!(state.selected, PARAM_COUNT - 1, "Should wrap to last");
        state.navigate(1);
        assert_eq!(state.selected, 0, "Should wrap back to first");
    }

    #[test]
    fn test_param_get_set_roundtrip() {
        let mut params = SolverParams::default();
        for def in &PARAM_DEFS {
            let orig = (def.get)(&params);
            let half_steps = ((def.max - def.min) / 2.0 / def.step).round();
            let new_val = def.min + half_steps * def.step;
            (def.set)(&mut params, new_val);
            let read_back = (def.get)(&params);
            assert!(
                (read_back - new_val).abs() < 1e-10,
                "Param {} get/set roundtrip failed: {} vs {}",
                def.name,
                read_back,
                new_val
            );
            (def.set)(&mut params, orig); // restore
        }
    }

    #[test]
    fn test_defaults_within_ranges() {
        let defaults = SolverParams::default();
        for def in &PARAM_DEFS {
            let v = (def.get)(&defaults);
            assert!(
                v >= def.min && v <= def.max,
                "default for {} ({}) outside [{}, {}]",
                def.name,
                v,
                def.min,
                def.max
            );
        }
    }

    #[test]
    fn test_adjusted_params_stay_valid() {
        let mut params = SolverParams::default();
        for i in 0..PARAM_COUNT {
            for _ in 0..200 {
                adjust_param(&mut params, i, -1, false);
            }
            assert!(params.validate().is_ok(), "{} at min should be valid", PARAM_DEFS[i].name);
        }
    }

    #[test]
    fn test_dim_reduces_brightness() {
        let w = 10;
        let h = 10;
        let mut buf = vec![128u8; w * h * 4];
        Rect { x: 2, y: 2, w: 4, h: 4 }.dim(&mut buf, w, 0.25);

        let off = (3 * w + 3) * 4;
        assert_eq!(buf[off], 32, "R should be darkened");
        assert_eq!(buf[off + 3], 128, "alpha is left alone");
        assert_eq!(buf[0], 128, "outside area should be unchanged");
    }

    #[test]
    fn test_rect_clips_to_frame() {
        let w = 6;
        let mut buf = vec![0u8; w * 4 * 4];
        // Runs past the right edge and the bottom; nothing wraps or panics.
        Rect { x: 4, y: 2, w: 5, h: 5 }.outline(&mut buf, w, [0xFF; 3]);
        assert_eq!(buf[(2 * w) * 4], 0, "no wrap into column 0");
        assert_eq!(buf[(2 * w + 4) * 4], 0xFF);
    }

    #[test]
    fn test_gauge_empty_full_and_mark() {
        let w = 120;
        let area = Rect { x: 4, y: 4, w: GAUGE_WIDTH * CHAR_STEP, h: FONT_HEIGHT };
        let mut empty = vec![0u8; w * 20 * 4];
        let mut full = vec![0u8; w * 20 * 4];
        draw_gauge(&mut empty, w, area, 0.0, 1.0);
        draw_gauge(&mut full, w, area, 1.0, 1.0);

        let start = (4 * w + 4) * 4;
        assert_eq!(empty[start], 0x22, "empty gauge should be #22 at start");
        assert!(full[start + 1] > 0x22, "full gauge should have teal fill");
        let last = (4 * w + 4 + area.w - 1) * 4;
        assert_eq!(empty[last], 0xEE, "startup mark drawn at the right end");
    }

    #[test]
    fn test_panel_stays_above_status_bar() {
        let cfg = test_config();
        let panel = panel_rect(&cfg).unwrap();
        assert!(panel.y + panel.h <= cfg.status_y());
        assert!(panel.x + panel.w <= cfg.frame_width);

        let tiny = RenderConfig::fit(4, 2, Grid::new(8, 8).unwrap());
        assert_eq!(panel_rect(&tiny), None);
    }

    #[test]
    fn test_overlay_invisible_noop() {
        let cfg = test_config();
        let mut buf = vec![42u8; cfg.frame_width * cfg.frame_height * 4];
        let orig = buf.clone();
        let state = OverlayState::new(); // visible = false
        let params = SolverParams::default();

        render_overlay(&mut buf, &cfg, &state, &params, &params);

        assert_eq!(buf, orig, "Invisible overlay should not modify buffer");
    }

    #[test]
    fn test_overlay_visible_leaves_status_bar() {
        let cfg = test_config();
        let mut buf = vec![42u8; cfg.frame_width * cfg.frame_height * 4];
        let mut state = OverlayState::new();
        state.toggle();
        let params = SolverParams::default();
        render_overlay(&mut buf, &cfg, &state, &params, &params);

        let status_start = cfg.status_y() * cfg.frame_width * 4;
        assert!(buf[..status_start].iter().any(|&b| b != 42), "panel should be drawn");
        assert!(buf[status_start..].iter().all(|&b| b == 42), "status bar untouched");
    }

    #[test]
    fn test_adjust_clamps() {
        let mut params = SolverParams::default();

        params.relax_iterations = 1;
        let changed = adjust_param(&mut params, 0, -1, false);
        assert!(!changed, "Should not change when at min");
        assert_eq!(params.relax_iterations, 1);

        params.relax_iterations = 64;
        let changed = adjust_param(&mut params, 0, 1, false);
        assert!(!changed, "Should not change when at max");
        assert_eq!(params.relax_iterations, 64);

        assert!(adjust_param(&mut params, 1, 1, true));
        assert!((params.relax_coefficient - 0.252).abs() < 1e-12);
    }

    #[test]
    fn test_reset_restores_startup_value() {
        let defaults = SolverParams::for_grid(Grid::new(64, 64).unwrap());
        let mut params = defaults.clone();
        params.forcing.velocity_radius = 40.0;
        reset_param(&mut params, &defaults, 3);
        assert!(
            (params.forcing.velocity_radius - 1.5).abs() < 1e-10,
            "v.rad should be reset to 1.5, got {}",
            params.forcing.velocity_radius
        );
    }
}
