//! In-memory host used by tests and benches.
//!
//! `RecordingHost` keeps a child list, per-tile style classes and placements,
//! and queues deferred tasks instead of running them so a driver can decide
//! when each "event loop turn" happens.

use std::collections::HashMap;

use crate::geometry::{Size, Span};
use crate::layout::TilePlacement;

use super::{CycleListener, DeferredTask, LayoutHost, TileHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall<T> {
    ApplySpan(T, Span),
    AddClass(T, String),
    RemoveClass(T, String),
    Place(T, TilePlacement),
    Extent(Size),
    Reposition(T, usize),
    Attached(T),
    Detached(T),
    Removed(T),
    Scheduled(DeferredTask),
    Cancelled(DeferredTask),
}

#[derive(Debug, Clone)]
pub struct RecordingHost<T> {
    children: Vec<T>,
    spans: HashMap<T, Span>,
    measured: HashMap<T, Size>,
    classes: HashMap<T, Vec<String>>,
    placements: HashMap<T, TilePlacement>,
    unit: Size,
    width: f32,
    extent: Option<Size>,
    deferred: Vec<DeferredTask>,
    calls: Vec<HostCall<T>>,
}

impl<T: TileHandle> RecordingHost<T> {
    /// `unit` is the rendered size of a 1x1 tile.
    pub fn new(width: f32, unit: Size) -> Self {
        Self {
            children: Vec::new(),
            spans: HashMap::new(),
            measured: HashMap::new(),
            classes: HashMap::new(),
            placements: HashMap::new(),
            unit,
            width,
            extent: None,
            deferred: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Append a child rendered at `span`.
    pub fn add_tile(&mut self, tile: T, span: Span) {
        self.measured.insert(tile.clone(), self.size_for(span));
        self.spans.insert(tile.clone(), span);
        self.children.push(tile);
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn has_class(&self, tile: &T, class: &str) -> bool {
        self.classes
            .get(tile)
            .map(|list| list.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn classes_of(&self, tile: &T) -> Vec<String> {
        self.classes.get(tile).cloned().unwrap_or_default()
    }

    pub fn placement(&self, tile: &T) -> Option<TilePlacement> {
        self.placements.get(tile).copied()
    }

    pub fn extent(&self) -> Option<Size> {
        self.extent
    }

    pub fn children(&self) -> &[T] {
        &self.children
    }

    /// Drain queued deferred tasks so the driver can run them.
    pub fn take_deferred(&mut self) -> Vec<DeferredTask> {
        std::mem::take(&mut self.deferred)
    }

    pub fn pending_deferred(&self) -> &[DeferredTask] {
        &self.deferred
    }

    pub fn calls(&self) -> &[HostCall<T>] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn size_for(&self, span: Span) -> Size {
        Size::new(
            self.unit.width * span.cols as f32,
            self.unit.height * span.rows as f32,
        )
    }
}

impl<T: TileHandle> LayoutHost<T> for RecordingHost<T> {
    fn tiles(&self) -> Vec<T> {
        self.children.clone()
    }

    fn measure(&self, tile: &T) -> Size {
        self.measured
            .get(tile)
            .copied()
            .unwrap_or_else(|| self.size_for(Span::unit()))
    }

    fn span(&self, tile: &T) -> Span {
        self.spans.get(tile).copied().unwrap_or_else(Span::unit)
    }

    // The rendered size lags the style swap until the tile is placed again.
    fn apply_span(&mut self, tile: &T, span: Span) {
        self.spans.insert(tile.clone(), span);
        self.calls.push(HostCall::ApplySpan(tile.clone(), span));
    }

    fn container_width(&self) -> f32 {
        self.width
    }

    fn add_style_class(&mut self, tile: &T, class: &str) {
        let list = self.classes.entry(tile.clone()).or_default();
        if !list.iter().any(|c| c == class) {
            list.push(class.to_string());
        }
        self.calls.push(HostCall::AddClass(tile.clone(), class.to_string()));
    }

    fn remove_style_class(&mut self, tile: &T, class: &str) {
        if let Some(list) = self.classes.get_mut(tile) {
            list.retain(|c| c != class);
        }
        self.calls
            .push(HostCall::RemoveClass(tile.clone(), class.to_string()));
    }

    fn place_tile(&mut self, tile: &T, placement: &TilePlacement) {
        self.placements.insert(tile.clone(), *placement);
        self.measured.insert(
            tile.clone(),
            Size::new(placement.width, placement.height),
        );
        self.calls.push(HostCall::Place(tile.clone(), *placement));
    }

    fn set_container_extent(&mut self, extent: Size) {
        self.extent = Some(extent);
        self.calls.push(HostCall::Extent(extent));
    }

    fn reposition_tile(&mut self, tile: &T, index: usize) {
        if let Some(current) = self.children.iter().position(|c| c == tile) {
            self.children.remove(current);
            let index = index.min(self.children.len());
            self.children.insert(index, tile.clone());
        }
        self.calls.push(HostCall::Reposition(tile.clone(), index));
    }

    fn notify_attached(&mut self, tile: &T) {
        self.calls.push(HostCall::Attached(tile.clone()));
    }

    fn notify_detached(&mut self, tile: &T) {
        self.calls.push(HostCall::Detached(tile.clone()));
    }

    fn detach_tile(&mut self, tile: &T) {
        self.children.retain(|c| c != tile);
        self.classes.remove(tile);
        self.placements.remove(tile);
        self.calls.push(HostCall::Removed(tile.clone()));
    }

    fn schedule_deferred(&mut self, task: DeferredTask) {
        self.deferred.push(task);
        self.calls.push(HostCall::Scheduled(task));
    }

    fn cancel_deferred(&mut self, task: DeferredTask) {
        self.deferred.retain(|queued| *queued != task);
        self.calls.push(HostCall::Cancelled(task));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerCall<T> {
    Shown(T),
    Hidden(T),
    LayoutSettled,
    CycleStarting,
    CycleEnded,
}

/// Listener that records every callback in arrival order.
#[derive(Debug, Clone)]
pub struct RecordingListener<T> {
    calls: Vec<ListenerCall<T>>,
}

impl<T> Default for RecordingListener<T> {
    fn default() -> Self {
        Self { calls: Vec::new() }
    }
}

impl<T: TileHandle> RecordingListener<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[ListenerCall<T>] {
        &self.calls
    }

    pub fn count(&self, call: &ListenerCall<T>) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &ListenerCall<T>) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl<T: TileHandle> CycleListener<T> for RecordingListener<T> {
    fn on_tile_shown(&mut self, tile: &T) {
        self.calls.push(ListenerCall::Shown(tile.clone()));
    }

    fn on_tile_hidden(&mut self, tile: &T) {
        self.calls.push(ListenerCall::Hidden(tile.clone()));
    }

    fn on_layout_settled(&mut self) {
        self.calls.push(ListenerCall::LayoutSettled);
    }

    fn on_cycle_starting(&mut self) {
        self.calls.push(ListenerCall::CycleStarting);
    }

    fn on_cycle_ended(&mut self) {
        self.calls.push(ListenerCall::CycleEnded);
    }
}
