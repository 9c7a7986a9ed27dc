use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use blake3::Hash as Digest;

use crate::geometry::{CellSize, Edge, Size, Span};

use super::grid::{GridPosition, OccupancyMap};

/// A tile together with the cell it was packed into.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedTile<T> {
    pub tile: T,
    pub position: GridPosition,
    /// Span actually occupied, after clamping to the column count.
    pub span: Span,
}

/// Output of one packing pass. Recomputed from scratch on every layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PackResult<T> {
    pub tiles: Vec<PackedTile<T>>,
    pub columns: u32,
    pub rows: u32,
    pub cell_size: CellSize,
    /// Widest span requested, measured before clamping.
    pub max_col_span: u32,
}

impl<T> PackResult<T> {
    pub fn empty() -> Self {
        Self {
            tiles: Vec::new(),
            columns: 0,
            rows: 0,
            cell_size: CellSize::default(),
            max_col_span: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Size of the container placeholder that holds the packed tiles.
    pub fn extent(&self) -> Size {
        let used_cols = self
            .tiles
            .iter()
            .map(|packed| packed.position.col + packed.span.cols)
            .max()
            .unwrap_or(0);
        let cols = used_cols.max(self.max_col_span);
        Size::new(
            cols as f32 * self.cell_size.w,
            self.rows as f32 * self.cell_size.h,
        )
    }

    /// Pixel placement for a packed tile.
    pub fn placement(&self, packed: &PackedTile<T>, edge: Edge) -> TilePlacement {
        TilePlacement {
            edge,
            inline: packed.position.col as f32 * self.cell_size.w,
            top: packed.position.row as f32 * self.cell_size.h,
            width: packed.span.cols as f32 * self.cell_size.w,
            height: packed.span.rows as f32 * self.cell_size.h,
        }
    }
}

impl<T: Clone + Eq + Hash> PackResult<T> {
    pub fn position_of(&self, tile: &T) -> Option<GridPosition> {
        self.tiles
            .iter()
            .find(|packed| &packed.tile == tile)
            .map(|packed| packed.position)
    }

    /// Span the tile was laid out at, after clamping.
    pub fn span_of(&self, tile: &T) -> Option<Span> {
        self.tiles
            .iter()
            .find(|packed| &packed.tile == tile)
            .map(|packed| packed.span)
    }

    pub fn positions(&self) -> HashMap<T, GridPosition> {
        self.tiles
            .iter()
            .map(|packed| (packed.tile.clone(), packed.position))
            .collect()
    }

    /// Tiles in reading order: by row, then column.
    pub fn visual_order(&self) -> Vec<T> {
        let mut ordered: Vec<&PackedTile<T>> = self.tiles.iter().collect();
        ordered.sort_by_key(|packed| (packed.position.row, packed.position.col));
        ordered.into_iter().map(|packed| packed.tile.clone()).collect()
    }

    /// Digest of the packed arrangement, used to detect visual changes
    /// between passes without keeping the previous result around.
    pub fn fingerprint(&self) -> Digest {
        let mut writer = DigestWriter(blake3::Hasher::new());
        writer.write_u32(self.columns);
        writer.write_u32(self.rows);
        writer.write_u32(self.cell_size.w.to_bits());
        writer.write_u32(self.cell_size.h.to_bits());
        for packed in &self.tiles {
            packed.tile.hash(&mut writer);
            writer.write_u32(packed.position.col);
            writer.write_u32(packed.position.row);
            writer.write_u32(packed.span.cols);
            writer.write_u32(packed.span.rows);
        }
        writer.0.finalize()
    }
}

struct DigestWriter(blake3::Hasher);

impl Hasher for DigestWriter {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = self.0.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

/// Physical offsets applied to a tile after packing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub edge: Edge,
    /// Offset from `edge`.
    pub inline: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl TilePlacement {
    /// Compares offsets rounded to whole units against a previous placement.
    pub fn moved_from(&self, previous: &TilePlacement) -> bool {
        self.edge != previous.edge
            || self.top.round() != previous.top.round()
            || self.inline.round() != previous.inline.round()
    }
}

/// First-fit, row-major packing of `tiles` (already in original order).
///
/// Each tile's column span is clamped to the grid width; row spans are never
/// touched and rows grow on demand, so packing cannot fail.
pub fn pack<T: Clone>(tiles: &[(T, Span)], cell: CellSize, container_width: f32) -> PackResult<T> {
    if tiles.is_empty() {
        return PackResult::empty();
    }

    let columns = cell.columns_for(container_width);
    let mut map = OccupancyMap::new(columns);
    let mut packed = Vec::with_capacity(tiles.len());
    let mut max_col_span = 0;

    for (tile, span) in tiles {
        max_col_span = max_col_span.max(span.cols);
        let span = Span {
            cols: span.cols.min(columns),
            rows: span.rows,
        };
        let position = map.first_fit(span);
        map.occupy(position, span);
        packed.push(PackedTile {
            tile: tile.clone(),
            position,
            span,
        });
    }

    PackResult {
        tiles: packed,
        columns,
        rows: map.rows(),
        cell_size: cell,
        max_col_span,
    }
}
