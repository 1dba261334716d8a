use crate::error::{ConfigError, SimError};
use crate::solver::FrameStats;

/// Reference grid extent (cells per side).
pub const DEFAULT_EXTENT: usize = 640;

/// Fixed rectangular domain shared by every field. `y` points up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidGrid { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of cells.
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index. Caller guarantees `x < width` and `y < height`.
    #[inline(always)]
    pub const fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether a continuous grid position lies inside the domain.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64
    }

    /// Scale factor of this grid relative to the reference extent (shorter side).
    pub fn reference_scale(&self) -> f64 {
        self.width.min(self.height) as f64 / DEFAULT_EXTENT as f64
    }
}

/// One scalar per cell (pressure, divergence).
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    pub values: Vec<f64>,
}

impl ScalarField {
    pub fn zeros(grid: Grid) -> Self {
        Self { values: vec![0.0; grid.len()] }
    }

    pub fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }
}

/// Two components per cell, stored as separate planes.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityField {
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
}

impl VelocityField {
    pub fn zeros(grid: Grid) -> Self {
        Self {
            vx: vec![0.0; grid.len()],
            vy: vec![0.0; grid.len()],
        }
    }

    pub fn fill(&mut self, vx: f64, vy: f64) {
        self.vx.fill(vx);
        self.vy.fill(vy);
    }
}

/// Front/back buffer pair. Stages read `front`, write `back`, then `swap`.
#[derive(Clone, Debug)]
pub struct DoubleBuffer<T> {
    buffers: [T; 2],
    front: usize,
}

impl<T: Clone> DoubleBuffer<T> {
    pub fn new(initial: T) -> Self {
        Self {
            buffers: [initial.clone(), initial],
            front: 0,
        }
    }
}

impl<T> DoubleBuffer<T> {
    pub fn front(&self) -> &T {
        &self.buffers[self.front]
    }

    /// Mutable access to the persisted contents (used by the injector between frames).
    pub fn front_mut(&mut self) -> &mut T {
        &mut self.buffers[self.front]
    }

    pub fn back(&self) -> &T {
        &self.buffers[1 - self.front]
    }

    pub fn back_mut(&mut self) -> &mut T {
        &mut self.buffers[1 - self.front]
    }

    /// Borrow the front for reading and the back for writing at the same time.
    pub fn split(&mut self) -> (&T, &mut T) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Publish the back buffer as the new front.
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    pub fn buffers_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.buffers.iter_mut()
    }
}

/// Persisted simulation fields plus per-frame scratch.
pub struct SimState {
    pub grid: Grid,
    pub velocity: DoubleBuffer<VelocityField>,
    pub pressure: DoubleBuffer<ScalarField>,
    /// Advected velocity, rebuilt every frame.
    pub advected: VelocityField,
    /// Divergence of the advected velocity, rebuilt every frame.
    pub divergence: ScalarField,
    pub frame: u64,
}

impl SimState {
    /// Neutral start: zero velocity, zero pressure.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            velocity: DoubleBuffer::new(VelocityField::zeros(grid)),
            pressure: DoubleBuffer::new(ScalarField::zeros(grid)),
            advected: VelocityField::zeros(grid),
            divergence: ScalarField::zeros(grid),
            frame: 0,
        }
    }

    /// Zero every field in place. Buffers are kept, never reallocated.
    pub fn clear(&mut self) {
        for v in self.velocity.buffers_mut() {
            v.fill(0.0, 0.0);
        }
        for p in self.pressure.buffers_mut() {
            p.fill(0.0);
        }
        self.advected.fill(0.0, 0.0);
        self.divergence.fill(0.0);
    }

    /// Check that every persisted and scratch buffer covers the grid.
    pub fn check_fields(&self) -> Result<(), SimError> {
        let expected = self.grid.len();
        let checks: [(&'static str, usize); 8] = [
            ("velocity.x", self.velocity.front().vx.len()),
            ("velocity.y", self.velocity.front().vy.len()),
            ("velocity.back", self.velocity.back().vx.len().min(self.velocity.back().vy.len())),
            ("pressure", self.pressure.front().values.len()),
            ("pressure.back", self.pressure.back().values.len()),
            ("advected.x", self.advected.vx.len()),
            ("advected.y", self.advected.vy.len()),
            ("divergence", self.divergence.values.len()),
        ];
        for (field, found) in checks {
            if found != expected {
                return Err(SimError::MissingInput { field, expected, found });
            }
        }
        Ok(())
    }

    /// Allocating snapshot convenience method (used in tests).
    #[cfg(test)]
    pub fn snapshot(&self) -> FrameSnapshot {
        let mut snap = FrameSnapshot::new_empty(self.grid);
        self.snapshot_into(&mut snap, FrameStats::default());
        snap
    }

    /// Copy current state into a pre-allocated snapshot, avoiding allocation.
    pub fn snapshot_into(&self, dst: &mut FrameSnapshot, stats: FrameStats) {
        let velocity = self.velocity.front();
        dst.grid = self.grid;
        dst.vx.resize(self.grid.len(), 0.0);
        dst.vy.resize(self.grid.len(), 0.0);
        dst.pressure.resize(self.grid.len(), 0.0);
        dst.divergence.resize(self.grid.len(), 0.0);
        dst.vx.copy_from_slice(&velocity.vx);
        dst.vy.copy_from_slice(&velocity.vy);
        dst.pressure.copy_from_slice(&self.pressure.front().values);
        dst.divergence.copy_from_slice(&self.divergence.values);
        dst.frame = self.frame;
        dst.stats = stats;
    }
}

/// Read-only copy of one frame handed to the display thread.
pub struct FrameSnapshot {
    pub grid: Grid,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub pressure: Vec<f64>,
    pub divergence: Vec<f64>,
    pub frame: u64,
    pub stats: FrameStats,
}

impl FrameSnapshot {
    /// Pre-allocate a snapshot buffer matching the given grid.
    pub fn new_empty(grid: Grid) -> Self {
        FrameSnapshot {
            grid,
            vx: vec![0.0; grid.len()],
            vy: vec![0.0; grid.len()],
            pressure: vec![0.0; grid.len()],
            divergence: vec![0.0; grid.len()],
            frame: 0,
            stats: FrameStats::default(),
        }
    }
}
