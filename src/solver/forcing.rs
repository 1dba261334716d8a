use super::params::ForcingParams;
use crate::state::{Grid, SimState};

/// One pointer-drag sample in grid coordinates (`y` up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub position: (f64, f64),
    pub previous: (f64, f64),
}

impl DragEvent {
    pub fn new(previous: (f64, f64), position: (f64, f64)) -> Self {
        Self { position, previous }
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.position.0 - self.previous.0, self.position.1 - self.previous.1)
    }

    /// Stamp direction: clamped delta normalised to `[-1, 1]` per axis.
    pub fn direction(&self, delta_clamp: f64) -> (f64, f64) {
        let (dx, dy) = self.delta();
        (
            dx.clamp(-delta_clamp, delta_clamp) / delta_clamp,
            dy.clamp(-delta_clamp, delta_clamp) / delta_clamp,
        )
    }
}

/// Soft-edged capsule swept along a drag segment.
/// Coverage is 1 inside `radius - blur`, 0 beyond `radius + blur`, smooth in between.
#[derive(Debug, Clone, Copy)]
struct SoftStroke {
    from: (f64, f64),
    to: (f64, f64),
    radius: f64,
    blur: f64,
}

impl SoftStroke {
    fn reach(&self) -> f64 {
        self.radius + self.blur
    }

    fn coverage(&self, x: f64, y: f64) -> f64 {
        let d = distance_to_segment((x, y), self.from, self.to);
        let inner = (self.radius - self.blur).max(0.0);
        let outer = self.reach();
        if d <= inner {
            1.0
        } else if d >= outer {
            0.0
        } else {
            1.0 - smoothstep(inner, outer, d)
        }
    }

    /// Cell rectangle `[x0, x1) x [y0, y1)` touched by the stroke, or `None` if it misses the grid.
    fn bounds(&self, grid: Grid) -> Option<(usize, usize, usize, usize)> {
        let r = self.reach();
        let lo_x = (self.from.0.min(self.to.0) - r).floor().max(0.0);
        let hi_x = (self.from.0.max(self.to.0) + r).ceil() + 1.0;
        let lo_y = (self.from.1.min(self.to.1) - r).floor().max(0.0);
        let hi_y = (self.from.1.max(self.to.1) + r).ceil() + 1.0;
        let x1 = hi_x.min(grid.width as f64);
        let y1 = hi_y.min(grid.height as f64);
        if !(lo_x < x1 && lo_y < y1) {
            return None;
        }
        Some((lo_x as usize, x1 as usize, lo_y as usize, y1 as usize))
    }
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Alpha-over composite of `value` into `plane` under the stroke's coverage.
fn composite(plane: &mut [f64], grid: Grid, stroke: &SoftStroke, value: f64) {
    let Some((x0, x1, y0, y1)) = stroke.bounds(grid) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let a = stroke.coverage(x as f64, y as f64);
            if a > 0.0 {
                let i = grid.idx(x, y);
                plane[i] = value * a + plane[i] * (1.0 - a);
            }
        }
    }
}

/// Stamp one drag into the persisted velocity and pressure fields.
/// Must run between frames; returns `false` when the event was ignored.
pub fn inject(state: &mut SimState, event: &DragEvent, params: &ForcingParams) -> bool {
    let grid = state.grid;
    let (x, y) = event.position;
    if !grid.contains(x, y) {
        return false;
    }
    let (px, py) = event.previous;
    // A previous sample off-grid or garbage just degrades to a disc.
    let previous = if px.is_finite() && py.is_finite() { (px, py) } else { (x, y) };

    let (dir_x, dir_y) = event.direction(params.delta_clamp);
    let velocity_stroke = SoftStroke {
        from: previous,
        to: (x, y),
        radius: params.velocity_radius,
        blur: params.velocity_blur,
    };
    let pressure_stroke = SoftStroke {
        from: previous,
        to: (x, y),
        radius: params.pressure_radius,
        blur: params.pressure_blur,
    };

    let velocity = state.velocity.front_mut();
    composite(&mut velocity.vx, grid, &velocity_stroke, dir_x);
    composite(&mut velocity.vy, grid, &velocity_stroke, dir_y);
    composite(&mut state.pressure.front_mut().values, grid, &pressure_stroke, params.pressure_impulse);

    log::trace!("stamped drag at ({x:.1}, {y:.1}) dir=({dir_x:.2}, {dir_y:.2})");
    true
}
