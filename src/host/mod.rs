//! Capabilities the embedding component supplies to the engine, and the
//! callbacks the engine reports back through.

use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{Size, Span};
use crate::layout::TilePlacement;

pub mod recording;

pub use recording::{HostCall, ListenerCall, RecordingHost, RecordingListener};

/// Any caller-owned handle the engine can track.
pub trait TileHandle: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> TileHandle for T {}

/// Work the engine asks the host to run on a later turn of its event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredKind {
    /// Swap hide-from to hide-to once the first style has been committed.
    HideCommit,
    /// Arm the show transition after leftover layout events have drained.
    ShowPreparation,
}

/// Handle for a scheduled continuation. The generation lets the engine drop
/// tasks that were cancelled or superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredTask {
    pub kind: DeferredKind,
    pub generation: u64,
}

/// Rendering, measuring and scheduling capabilities owned by the embedder.
pub trait LayoutHost<T> {
    /// Tiles currently in the container, in child order.
    fn tiles(&self) -> Vec<T>;

    /// Outer box of a tile, margins included.
    fn measure(&self, tile: &T) -> Size;

    fn span(&self, tile: &T) -> Span;

    /// Swap the tile's size style to `span`.
    fn apply_span(&mut self, tile: &T, span: Span);

    fn container_width(&self) -> f32;

    fn add_style_class(&mut self, tile: &T, class: &str);

    fn remove_style_class(&mut self, tile: &T, class: &str);

    fn place_tile(&mut self, tile: &T, placement: &TilePlacement);

    /// Size the placeholder that reserves room for the packed grid.
    fn set_container_extent(&mut self, extent: Size);

    /// Move a tile to `index` in the host's child order.
    fn reposition_tile(&mut self, tile: &T, index: usize);

    fn notify_attached(&mut self, _tile: &T) {}

    fn notify_detached(&mut self, _tile: &T) {}

    /// Final removal of a hidden tile from the container.
    fn detach_tile(&mut self, tile: &T);

    /// Run `task` later by calling `MasonryEngine::run_deferred`.
    fn schedule_deferred(&mut self, task: DeferredTask);

    fn cancel_deferred(&mut self, task: DeferredTask);
}

/// Completion callbacks fired by the engine.
pub trait CycleListener<T> {
    fn on_tile_shown(&mut self, _tile: &T) {}

    fn on_tile_hidden(&mut self, _tile: &T) {}

    fn on_layout_settled(&mut self) {}

    fn on_cycle_starting(&mut self) {}

    fn on_cycle_ended(&mut self) {}
}

/// Listener that ignores every callback.
#[derive(Debug, Default)]
pub struct NullListener;

impl<T> CycleListener<T> for NullListener {}
