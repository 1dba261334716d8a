use crate::renderer::RenderConfig;
use crate::solver::DragEvent;
use crate::state::Grid;

/// Turns raw pointer samples into drag events in grid coordinates.
///
/// A press only arms the tracker; events are emitted while the button stays
/// down and the pointer moves over the field.
#[derive(Debug, Default)]
pub struct DragTracker {
    last: Option<(f64, f64)>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer sample in window pixels.
    pub fn update(&mut self, cfg: &RenderConfig, mouse: Option<(f32, f32)>, down: bool) -> Option<DragEvent> {
        if !down {
            self.last = None;
            return None;
        }
        let Some(pos) = mouse.and_then(|(x, y)| cfg.to_grid(x as f64, y as f64)) else {
            self.last = None;
            return None;
        };
        match self.last.replace(pos) {
            Some(prev) if prev != pos => Some(DragEvent::new(prev, pos)),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}

/// Scripted circular stir for headless runs.
#[derive(Debug, Clone)]
pub struct StirPath {
    center: (f64, f64),
    radius: f64,
    angle: f64,
    step: f64,
}

impl StirPath {
    /// Circle of a quarter of the shorter side, one turn every `period` frames.
    pub fn new(grid: Grid, period: usize) -> Self {
        Self {
            center: (grid.width as f64 / 2.0, grid.height as f64 / 2.0),
            radius: grid.width.min(grid.height) as f64 / 4.0,
            angle: 0.0,
            step: std::f64::consts::TAU / period.max(1) as f64,
        }
    }

    fn point(&self, angle: f64) -> (f64, f64) {
        (
            self.center.0 + self.radius * angle.cos(),
            self.center.1 + self.radius * angle.sin(),
        )
    }

    /// Advance one frame and return the drag along the arc.
    pub fn next_event(&mut self) -> DragEvent {
        let previous = self.point(self.angle);
        self.angle += self.step;
        DragEvent::new(previous, self.point(self.angle))
    }
}
