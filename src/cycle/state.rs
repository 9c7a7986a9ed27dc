use std::collections::{HashMap, HashSet};

use crate::geometry::Span;
use crate::host::{DeferredKind, DeferredTask, TileHandle};

/// Phase of the layout cycle. `None` is both the initial and the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    None,
    Hide,
    Layout,
    Show,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::Hide => "hide",
            Phase::Layout => "layout",
            Phase::Show => "show",
        }
    }
}

/// Everything the engine carries between calls.
///
/// Queues (`pending_*`) collect requests until a cycle consumes them; the
/// in-flight collections track the batch the current phase is working on.
#[derive(Debug)]
pub struct LayoutCycleState<T> {
    pub(crate) phase: Phase,
    pub(crate) pending_hide: Vec<T>,
    pub(crate) pending_show: Vec<T>,
    pub(crate) pending_resize: Vec<(T, Span)>,
    /// Current HIDE batch, until each tile has completed.
    pub(crate) hiding: Vec<T>,
    /// Tiles carrying hide-from, waiting for the commit step.
    pub(crate) hide_staged: Vec<T>,
    /// Tiles carrying hide-to, waiting for their transition to end.
    pub(crate) hide_armed: HashSet<T>,
    pub(crate) resizing: HashSet<T>,
    /// Span each resizing tile had before its style swap.
    pub(crate) prior_spans: HashMap<T, Span>,
    pub(crate) moved: HashSet<T>,
    /// Tiles carrying the transition class.
    pub(crate) animating: Vec<T>,
    /// Inserted tiles laid out by this cycle's LAYOUT, revealed in SHOW.
    pub(crate) show_batch: Vec<T>,
    /// Inserts hidden before their reveal; reported shown once LAYOUT settles.
    pub(crate) withdrawn: Vec<T>,
    pub(crate) show_armed: bool,
    pub(crate) queued_relayout: bool,
    pub(crate) reconcile_order: bool,
    pub(crate) hide_commit: Option<DeferredTask>,
    pub(crate) show_preparation: Option<DeferredTask>,
    generation: u64,
    /// Set while `finish_layout_cycle` cascades; suppresses new animations.
    pub(crate) fast_forwarding: bool,
}

impl<T> Default for LayoutCycleState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::None,
            pending_hide: Vec::new(),
            pending_show: Vec::new(),
            pending_resize: Vec::new(),
            hiding: Vec::new(),
            hide_staged: Vec::new(),
            hide_armed: HashSet::new(),
            resizing: HashSet::new(),
            prior_spans: HashMap::new(),
            moved: HashSet::new(),
            animating: Vec::new(),
            show_batch: Vec::new(),
            withdrawn: Vec::new(),
            show_armed: false,
            queued_relayout: false,
            reconcile_order: false,
            hide_commit: None,
            show_preparation: None,
            generation: 0,
            fast_forwarding: false,
        }
    }
}

impl<T: TileHandle> LayoutCycleState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queued_relayout(&self) -> bool {
        self.queued_relayout
    }

    /// True when a request is waiting for a cycle that has not started yet.
    pub fn has_pending_work(&self) -> bool {
        self.queued_relayout
            || !self.pending_hide.is_empty()
            || !self.pending_show.is_empty()
            || !self.pending_resize.is_empty()
    }

    pub fn is_hiding(&self, tile: &T) -> bool {
        self.hiding.contains(tile) || self.pending_hide.contains(tile)
    }

    pub fn queued_span(&self, tile: &T) -> Option<Span> {
        self.pending_resize
            .iter()
            .find(|(queued, _)| queued == tile)
            .map(|(_, span)| *span)
    }

    pub fn queue_resize(&mut self, tile: T, span: Span) {
        match self.pending_resize.iter_mut().find(|(queued, _)| *queued == tile) {
            Some(entry) => entry.1 = span,
            None => self.pending_resize.push((tile, span)),
        }
    }

    pub fn next_task(&mut self, kind: DeferredKind) -> DeferredTask {
        self.generation = self.generation.wrapping_add(1);
        DeferredTask {
            kind,
            generation: self.generation,
        }
    }

    /// Tiles whose transition-end the current phase is waiting for.
    pub fn awaiting(&self) -> Vec<T> {
        match self.phase {
            Phase::Hide => self
                .hiding
                .iter()
                .filter(|tile| self.hide_armed.contains(*tile))
                .cloned()
                .collect(),
            Phase::Layout => self
                .animating
                .iter()
                .filter(|tile| self.moved.contains(*tile))
                .cloned()
                .collect(),
            Phase::Show if self.show_armed => self.show_batch.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = LayoutCycleState::<u32>::new();
        assert_eq!(state.phase(), Phase::None);
        assert!(!state.has_pending_work());
        assert!(state.awaiting().is_empty());
    }

    #[test]
    fn queue_resize_replaces_target() {
        let mut state = LayoutCycleState::new();
        state.queue_resize(7u32, Span::new(2, 1));
        state.queue_resize(7u32, Span::new(2, 2));
        assert_eq!(state.pending_resize.len(), 1);
        assert_eq!(state.queued_span(&7), Some(Span::new(2, 2)));
        assert!(state.has_pending_work());
    }

    #[test]
    fn tasks_get_fresh_generations() {
        let mut state = LayoutCycleState::<u32>::new();
        let a = state.next_task(DeferredKind::HideCommit);
        let b = state.next_task(DeferredKind::HideCommit);
        assert_ne!(a, b);
    }

    #[test]
    fn awaiting_hide_lists_only_committed_tiles() {
        let mut state = LayoutCycleState::new();
        state.phase = Phase::Hide;
        state.hiding = vec![1u32, 2];
        state.hide_armed.insert(2);
        assert_eq!(state.awaiting(), vec![2]);
    }
}
