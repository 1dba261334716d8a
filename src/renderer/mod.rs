mod color;
mod font;

// Re-export public API
pub use color::ColorMap;
pub use font::render_status;
pub(crate) use font::{draw_text, draw_text_sized, FONT_HEIGHT, FONT_WIDTH, STATUS_BAR_HEIGHT};

pub(crate) use color::BAR_TOTAL;

use color::{BAR_GAP, BAR_WIDTH, LABEL_GAP, TICK_LEN};
use font::FONT_HEIGHT as FH;
use crate::state::{FrameSnapshot, Grid};

/// Which field is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VizMode {
    /// Positive pressure, clamped to [0, 1].
    Pressure,
    /// Velocity magnitude, normalised per frame.
    Speed,
    /// Signed divergence on a diverging palette.
    Divergence,
}

impl VizMode {
    /// Cycle to the next visualization mode.
    pub fn next(self) -> Self {
        match self {
            VizMode::Pressure => VizMode::Speed,
            VizMode::Speed => VizMode::Divergence,
            VizMode::Divergence => VizMode::Pressure,
        }
    }

    /// Short label for the color bar.
    pub fn label(self) -> &'static str {
        match self {
            VizMode::Pressure => "pres",
            VizMode::Speed => "vel",
            VizMode::Divergence => "div",
        }
    }

    fn tick_labels(self) -> [&'static str; 5] {
        match self {
            VizMode::Pressure => ["1.0", "0.7", "0.5", "0.2", "0.0"],
            VizMode::Speed => ["max", "", "", "", "0"],
            VizMode::Divergence => ["+", "", "0", "", "-"],
        }
    }
}

/// Presentation value of a pressure sample: the positive part, clamped to [0, 1].
pub fn present_pressure(p: f64) -> f64 {
    p.max(0.0).min(1.0)
}

/// Dynamic render layout computed from window pixel size.
/// The grid keeps its aspect ratio and is centered in the field area.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub display_width: usize,
    pub display_height: usize,
    pub frame_width: usize,
    pub frame_height: usize,
    pub grid: Grid,
    /// Pillarbox offset.
    pub display_x_offset: usize,
    /// Letterbox offset.
    pub display_y_offset: usize,
}

impl RenderConfig {
    /// Compute layout to fit the given pixel dimensions (field area plus color bar).
    /// The status bar is added below.
    pub fn fit(pixel_width: usize, pixel_height: usize, grid: Grid) -> Self {
        let available_width = pixel_width.saturating_sub(BAR_TOTAL).max(1);
        let available_height = pixel_height.max(1);

        let scale = (available_width as f64 / grid.width as f64).min(available_height as f64 / grid.height as f64);
        let display_width = ((grid.width as f64 * scale).round() as usize).clamp(1, available_width);
        let display_height = ((grid.height as f64 * scale).round() as usize).clamp(1, available_height);

        Self {
            display_width,
            display_height,
            frame_width: available_width + BAR_TOTAL,
            frame_height: available_height + STATUS_BAR_HEIGHT,
            grid,
            display_x_offset: (available_width - display_width) / 2,
            display_y_offset: (available_height - display_height) / 2,
        }
    }

    /// Horizontal scale: display pixels per simulation cell.
    pub fn scale_x(&self) -> f64 {
        self.display_width as f64 / self.grid.width as f64
    }

    /// Vertical scale: display pixels per simulation cell.
    pub fn scale_y(&self) -> f64 {
        self.display_height as f64 / self.grid.height as f64
    }

    /// First row of the status bar.
    pub fn status_y(&self) -> usize {
        self.frame_height - STATUS_BAR_HEIGHT
    }

    /// Map a window pixel position to grid coordinates (`y` up, cell centers on integers).
    /// Returns `None` outside the drawn field.
    pub fn to_grid(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let lx = px - self.display_x_offset as f64;
        let ly = py - self.display_y_offset as f64;
        if !(lx >= 0.0 && ly >= 0.0 && lx < self.display_width as f64 && ly < self.display_height as f64) {
            return None;
        }
        let max_x = (self.grid.width - 1) as f64;
        let max_y = (self.grid.height - 1) as f64;
        let gx = (lx / self.scale_x() - 0.5).clamp(0.0, max_x);
        let gy = (self.grid.height as f64 - 0.5 - ly / self.scale_y()).clamp(0.0, max_y);
        Some((gx, gy))
    }
}

/// Bilinear sample with edge clamping, for display only.
fn sample(values: &[f64], grid: Grid, x: f64, y: f64) -> f64 {
    let sx = x.clamp(0.0, (grid.width - 1) as f64);
    let sy = y.clamp(0.0, (grid.height - 1) as f64);
    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(grid.width - 1);
    let y1 = (y0 + 1).min(grid.height - 1);
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let v00 = values[grid.idx(x0, y0)];
    let v10 = values[grid.idx(x1, y0)];
    let v01 = values[grid.idx(x0, y1)];
    let v11 = values[grid.idx(x1, y1)];
    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}

/// Map the snapshot to a [0, 1] field for the chosen mode, plus the palette to use.
fn presentation_field(snap: &FrameSnapshot, viz_mode: VizMode, colormap: ColorMap) -> (Vec<f64>, ColorMap) {
    match viz_mode {
        VizMode::Pressure => (snap.pressure.iter().map(|&p| present_pressure(p)).collect(), colormap),
        VizMode::Speed => {
            let speed: Vec<f64> = snap.vx.iter().zip(&snap.vy).map(|(u, v)| (u * u + v * v).sqrt()).collect();
            let max = speed.iter().copied().fold(0.0, f64::max);
            let norm = if max > 1e-12 { 1.0 / max } else { 0.0 };
            (speed.iter().map(|s| s * norm).collect(), colormap)
        }
        VizMode::Divergence => {
            // Symmetric normalization keeps zero at the palette midpoint.
            let max = snap.divergence.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
            let norm = if max > 1e-12 { 0.5 / max } else { 0.0 };
            (snap.divergence.iter().map(|d| 0.5 + d * norm).collect(), ColorMap::BlueWhiteRed)
        }
    }
}

#[inline]
fn put_pixel(buf: &mut [u8], offset: usize, rgba: [u8; 4]) {
    buf[offset..offset + 4].copy_from_slice(&rgba);
}

/// Render field + color bar into a pre-allocated RGBA buffer.
/// The buffer is resized and zeroed as needed.
pub fn render_into(buf: &mut Vec<u8>, snap: &FrameSnapshot, cfg: &RenderConfig, viz_mode: VizMode, colormap: ColorMap) {
    let dw = cfg.display_width;
    let dh = cfg.display_height;
    let frame_width = cfg.frame_width;
    let x_off = cfg.display_x_offset;
    let y_off = cfg.display_y_offset;
    let grid = snap.grid;

    let total = frame_width * cfg.frame_height * 4;
    buf.resize(total, 0);
    buf.fill(0);

    let (field, colormap) = presentation_field(snap, viz_mode, colormap);
    if field.len() != grid.len() {
        log::warn!("snapshot size {} does not match grid {}x{}", field.len(), grid.width, grid.height);
        return;
    }

    // Screen rows run top-down, grid rows bottom-up.
    let cell_w = grid.width as f64 / dw as f64;
    let cell_h = grid.height as f64 / dh as f64;
    for screen_y in 0..dh {
        let sim_y = grid.height as f64 - 0.5 - (screen_y as f64 + 0.5) * cell_h;
        for screen_x in 0..dw {
            let sim_x = (screen_x as f64 + 0.5) * cell_w - 0.5;
            let t = sample(&field, grid, sim_x, sim_y);
            let offset = ((screen_y + y_off) * frame_width + screen_x + x_off) * 4;
            put_pixel(buf, offset, color::map_to_rgba(t, colormap));
        }
    }

    // Draw color bar (1.0 at top, 0.0 at bottom -- matching tick labels)
    let bar_x = x_off + dw + BAR_GAP;
    for y in 0..dh {
        let t = if dh > 1 { 1.0 - y as f64 / (dh - 1) as f64 } else { 1.0 };
        let rgba = color::map_to_rgba(t, colormap);
        for bx in 0..BAR_WIDTH {
            put_pixel(buf, ((y + y_off) * frame_width + bar_x + bx) * 4, rgba);
        }
    }

    // Draw tick marks and value labels at 0%, 25%, 50%, 75%, 100%
    let tick_x = bar_x + BAR_WIDTH;
    let label_x = tick_x + TICK_LEN + LABEL_GAP;
    let label_color: [u8; 3] = [0x88, 0x88, 0x88];
    for (tick, label) in viz_mode.tick_labels().iter().enumerate() {
        let y = tick * dh.saturating_sub(1) / 4;
        for dy in 0..2usize {
            let yy = (y + dy).min(dh - 1) + y_off;
            for tx in 0..TICK_LEN {
                put_pixel(buf, (yy * frame_width + tick_x + tx) * 4, [255, 255, 255, 255]);
            }
        }
        // Value label (vertically centered on tick)
        let label_y = y.saturating_sub(FH / 2).min(dh.saturating_sub(FH)) + y_off;
        font::draw_text(buf, frame_width, label_x, label_y, label, label_color);
    }

    // Draw type label above the bar
    let type_label = viz_mode.label();
    let type_label_y = y_off + if dh > FH + 4 { 2 } else { 0 };
    let type_label_w = type_label.len() * (FONT_WIDTH + 1);
    let type_label_x = (bar_x + BAR_WIDTH / 2).saturating_sub(type_label_w / 2);
    font::draw_text(buf, frame_width, type_label_x, type_label_y, type_label, [0xAA, 0xAA, 0xAA]);
}

/// Render field + color bar to a new RGBA buffer (test convenience wrapper).
#[cfg(test)]
pub fn render(snap: &FrameSnapshot, cfg: &RenderConfig, viz_mode: VizMode, colormap: ColorMap) -> Vec<u8> {
    let mut buf = Vec::new();
    render_into(&mut buf, snap, cfg, viz_mode, colormap);
    buf
}
