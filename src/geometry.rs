use serde::{Deserialize, Serialize};

/// Measured size in container units (outer box, margins included).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Tile size in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub cols: u32,
    pub rows: u32,
}

impl Span {
    /// # Panics
    /// Panics if either dimension is zero
    pub fn new(cols: u32, rows: u32) -> Self {
        assert!(cols >= 1 && rows >= 1, "Span dimensions must be at least 1");
        Self { cols, rows }
    }

    pub const fn unit() -> Self {
        Self { cols: 1, rows: 1 }
    }
}

/// Size of one grid cell, shared by every tile in a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellSize {
    pub w: f32,
    pub h: f32,
}

impl CellSize {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    /// Derive the unit cell from a tile's measured box and the span it covers.
    pub fn from_measured(measured: Size, span: Span) -> Self {
        Self {
            w: measured.width / span.cols as f32,
            h: measured.height / span.rows as f32,
        }
    }

    /// Number of whole columns that fit `available`, never less than one.
    pub fn columns_for(&self, available: f32) -> u32 {
        if self.w <= 0.0 || !available.is_finite() {
            return 1;
        }
        ((available / self.w).floor() as u32).max(1)
    }
}

/// Reading direction of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Physical edge that receives a tile's inline offset.
    pub fn inline_edge(self) -> Edge {
        match self {
            Direction::Ltr => Edge::Left,
            Direction::Rtl => Edge::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}
