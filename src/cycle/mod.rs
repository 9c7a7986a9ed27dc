//! Layout-cycle state machine.
//!
//! A cycle runs `NONE -> HIDE -> LAYOUT -> SHOW -> NONE`. Mutation requests
//! queue work; the engine advances when the host reports transition ends or
//! runs a deferred task, and falls through phases synchronously whenever
//! animation is unavailable or suppressed.

use std::collections::HashMap;
use std::time::Instant;

use blake3::Hash as Digest;
use serde_json::{Value, json};

use crate::capability::AnimationSupport;
use crate::error::{MasonryError, Result};
use crate::geometry::{CellSize, Span};
use crate::host::{CycleListener, DeferredKind, DeferredTask, LayoutHost, TileHandle};
use crate::layout::{PackResult, TilePlacement, pack};
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::metrics::{CycleMetrics, MetricSnapshot};
use crate::order::OrderBook;

pub mod audit;
pub mod config;
pub mod state;

pub use audit::{
    BufferedCycleAudit, CycleAudit, CycleAuditEvent, CycleAuditEventBuilder, CycleAuditStage,
    NullCycleAudit,
};
pub use config::{EngineConfig, EngineSettings, LogFileSettings, StyleClasses};
pub use state::{LayoutCycleState, Phase};

/// Masonry packing and transition engine bound to one host.
pub struct MasonryEngine<T, H, L> {
    host: H,
    listener: L,
    config: EngineConfig,
    support: AnimationSupport,
    state: LayoutCycleState<T>,
    order: OrderBook<T>,
    placements: HashMap<T, TilePlacement>,
    last_pack: Option<PackResult<T>>,
    fingerprint: Option<Digest>,
    started_at: Instant,
}

impl<T, H, L> MasonryEngine<T, H, L>
where
    T: TileHandle,
    H: LayoutHost<T>,
    L: CycleListener<T>,
{
    pub fn new(host: H, listener: L, config: EngineConfig) -> Self {
        let support = AnimationSupport::detect(
            &config.settings.environment,
            &config.settings.capability_table,
        );
        let engine = Self {
            host,
            listener,
            config,
            support,
            state: LayoutCycleState::new(),
            order: OrderBook::new(),
            placements: HashMap::new(),
            last_pack: None,
            fingerprint: None,
            started_at: Instant::now(),
        };
        engine.log(
            LogLevel::Info,
            "engine_constructed",
            [json_kv("animation", json!(support.is_enabled()))],
        );
        engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn order(&self) -> &OrderBook<T> {
        &self.order
    }

    pub fn state(&self) -> &LayoutCycleState<T> {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_in_layout_cycle(&self) -> bool {
        self.state.phase != Phase::None
    }

    /// Capability detection result, minus any temporary suppression.
    pub fn is_animation_enabled(&self) -> bool {
        self.support.is_enabled() && !self.state.fast_forwarding
    }

    pub fn last_pack(&self) -> Option<&PackResult<T>> {
        self.last_pack.as_ref()
    }

    /// Tiles whose transition end the active phase is waiting on.
    pub fn awaiting_transitions(&self) -> Vec<T> {
        self.state.awaiting()
    }

    pub fn get_cell_size(&self) -> CellSize {
        if let Some(pack) = self.last_pack.as_ref().filter(|pack| !pack.is_empty()) {
            return pack.cell_size;
        }
        self.host
            .tiles()
            .first()
            .map(|tile| CellSize::from_measured(self.host.measure(tile), self.host.span(tile)))
            .unwrap_or_default()
    }

    /// Lay the container out. Returns true when the arrangement changed or a
    /// cycle is still carrying the change.
    ///
    /// An initial setup adopts every host tile in child order, runs one pass
    /// without animation and rewrites the child order to match the packed
    /// order. A reorder-only setup relays out and reconciles child order once
    /// the cycle ends.
    pub fn setup(&mut self, is_initial: bool, is_reorder_only: bool) -> bool {
        let before = self.fingerprint;
        let tiles = self.host.tiles();
        self.order.adopt(tiles.iter());
        self.log(
            LogLevel::Debug,
            "setup",
            [
                json_kv("initial", json!(is_initial)),
                json_kv("reorder_only", json!(is_reorder_only)),
                json_kv("tiles", json!(tiles.len())),
            ],
        );

        if is_initial {
            self.finish_layout_cycle();
            let suppressed = self.state.fast_forwarding;
            self.state.fast_forwarding = true;
            self.state.reconcile_order = true;
            self.start_cycle();
            self.state.fast_forwarding = suppressed;
        } else {
            if is_reorder_only {
                self.state.reconcile_order = true;
            }
            self.request_layout();
        }

        self.fingerprint != before || self.is_in_layout_cycle()
    }

    /// Track a tile the host has just added and reveal it after the next
    /// layout. `index` is its position in original order.
    pub fn insert_tile(&mut self, tile: T, index: usize) {
        self.order.insert(tile.clone(), index);
        if self.state.pending_show.contains(&tile) || self.state.show_batch.contains(&tile) {
            return;
        }
        if self.is_animation_enabled() {
            let class = self.config.settings.style_classes.show_from.clone();
            self.host.add_style_class(&tile, &class);
        }
        self.log(
            LogLevel::Debug,
            "tile_insert_requested",
            [
                json_kv("tile", Self::describe(&tile)),
                json_kv("index", json!(index)),
            ],
        );
        self.state.pending_show.push(tile);
        self.schedule_after_mutation(false);
    }

    /// Hide and then detach a tile.
    pub fn hide_tile(&mut self, tile: T) {
        if self.state.is_hiding(&tile) {
            return;
        }
        let held = self.withdraw_insertion(&tile);
        self.state.pending_resize.retain(|(queued, _)| *queued != tile);
        self.log(
            LogLevel::Debug,
            "tile_hide_requested",
            [
                json_kv("tile", Self::describe(&tile)),
                json_kv("held", json!(held)),
            ],
        );
        self.state.pending_hide.push(tile);
        if held {
            // Its shown report belongs to this cycle, so the hide waits for the next.
            self.state.queued_relayout = true;
        } else {
            self.schedule_after_mutation(true);
        }
    }

    /// Swap a tile to `span` at the next layout boundary.
    ///
    /// Fails with `InvalidOperation` when `span` is already the tile's
    /// current (or already requested) span; no cycle work is queued then.
    pub fn resize_tile(&mut self, tile: T, span: Span) -> Result<()> {
        let target = self
            .state
            .queued_span(&tile)
            .unwrap_or_else(|| self.host.span(&tile));
        if target == span {
            return Err(MasonryError::InvalidOperation(format!(
                "tile {:?} already has span {}x{}",
                tile, span.cols, span.rows
            )));
        }
        if self.host.span(&tile) == span {
            // Back to the rendered span before the queued swap was applied.
            self.state.pending_resize.retain(|(queued, _)| *queued != tile);
            self.log(
                LogLevel::Debug,
                "tile_resize_withdrawn",
                [json_kv("tile", Self::describe(&tile))],
            );
            return Ok(());
        }
        self.log(
            LogLevel::Debug,
            "tile_resize_requested",
            [
                json_kv("tile", Self::describe(&tile)),
                json_kv("cols", json!(span.cols)),
                json_kv("rows", json!(span.rows)),
            ],
        );
        self.state.queue_resize(tile, span);
        self.schedule_after_mutation(false);
        Ok(())
    }

    /// Move a tile within original order. Applied by the next
    /// `setup(false, true)`.
    pub fn reorder_tile(&mut self, tile: &T, index: usize) -> Result<()> {
        if !self.order.move_to(tile, index) {
            return Err(MasonryError::InvalidOperation(format!(
                "tile {:?} is not tracked",
                tile
            )));
        }
        Ok(())
    }

    /// The container was resized outside the engine.
    pub fn resize_notify(&mut self) {
        self.log(
            LogLevel::Debug,
            "container_resized",
            [json_kv("width", json!(self.host.container_width()))],
        );
        self.request_layout();
    }

    /// Force the active cycle to its terminal state without waiting for any
    /// transition. No-op when idle.
    pub fn finish_layout_cycle(&mut self) {
        if self.state.phase == Phase::None {
            return;
        }

        self.log(
            LogLevel::Info,
            "fast_forward",
            [json_kv("phase", json!(self.state.phase.as_str()))],
        );
        self.audit(
            CycleAuditStage::FastForwarded,
            [json_kv("phase", json!(self.state.phase.as_str()))],
        );
        self.with_metrics(CycleMetrics::record_fast_forward);

        let suppressed = self.state.fast_forwarding;
        self.state.fast_forwarding = true;
        while self.state.phase != Phase::None {
            match self.state.phase {
                Phase::Hide => {
                    self.cancel_hide_commit();
                    for tile in self.state.hiding.clone() {
                        self.complete_hide(&tile);
                    }
                    self.advance_if_hidden();
                }
                Phase::Layout => self.finish_layout_phase(),
                Phase::Show => {
                    self.cancel_show_preparation();
                    for tile in self.state.show_batch.clone() {
                        self.complete_show(&tile);
                    }
                    self.advance_if_shown();
                }
                Phase::None => {}
            }
        }
        self.state.fast_forwarding = suppressed;
    }

    /// Transition-end notification from the host for `tile` in `phase`.
    /// Notifications that do not match the active phase are ignored.
    pub fn notify_transition_complete(&mut self, tile: &T, phase: Phase) {
        if phase != self.state.phase {
            self.ignore_transition(tile, phase);
            return;
        }

        match phase {
            Phase::Hide if self.state.hide_armed.contains(tile) => {
                self.complete_hide(tile);
                self.advance_if_hidden();
            }
            Phase::Layout if self.state.moved.remove(tile) => {
                if self.state.moved.is_empty() {
                    self.finish_layout_phase();
                }
            }
            Phase::Show if self.state.show_armed && self.state.show_batch.contains(tile) => {
                self.complete_show(tile);
                self.advance_if_shown();
            }
            _ => self.ignore_transition(tile, phase),
        }
    }

    /// Run a task previously handed to `LayoutHost::schedule_deferred`.
    pub fn run_deferred(&mut self, task: DeferredTask) {
        match task.kind {
            DeferredKind::HideCommit if self.state.hide_commit == Some(task) => {
                self.state.hide_commit = None;
                let classes = self.config.settings.style_classes.clone();
                for tile in std::mem::take(&mut self.state.hide_staged) {
                    self.host.remove_style_class(&tile, &classes.hide_from);
                    self.host.add_style_class(&tile, &classes.hide_to);
                    self.state.hide_armed.insert(tile);
                }
            }
            DeferredKind::ShowPreparation if self.state.show_preparation == Some(task) => {
                self.state.show_preparation = None;
                self.arm_show();
            }
            _ => self.log(
                LogLevel::Debug,
                "deferred_stale",
                [
                    json_kv("kind", json!(format!("{:?}", task.kind))),
                    json_kv("generation", json!(task.generation)),
                ],
            ),
        }
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started_at.elapsed()))
    }

    /// Log the current metrics snapshot, if both a logger and metrics exist.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) = (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let _ = logger.log_event(snapshot.to_log_event("masonry::metrics"));
        }
    }

    fn schedule_after_mutation(&mut self, joins_hide: bool) {
        match self.state.phase {
            Phase::None => self.start_cycle(),
            Phase::Hide if joins_hide => {
                let (held, batch): (Vec<T>, Vec<T>) = std::mem::take(&mut self.state.pending_hide)
                    .into_iter()
                    .partition(|tile| self.state.withdrawn.contains(tile));
                self.state.pending_hide = held;
                self.begin_hiding(batch);
                self.advance_if_hidden();
            }
            Phase::Hide => {}
            Phase::Layout | Phase::Show => self.state.queued_relayout = true,
        }
    }

    fn request_layout(&mut self) {
        match self.state.phase {
            Phase::None => self.start_cycle(),
            Phase::Hide => {}
            Phase::Layout | Phase::Show => self.state.queued_relayout = true,
        }
    }

    // A tile hidden before its reveal counts its insertion as complete. Before
    // the current LAYOUT settles the report is held back; returns true then.
    fn withdraw_insertion(&mut self, tile: &T) -> bool {
        let queued = self.state.pending_show.iter().position(|t| t == tile);
        let batched = self.state.show_batch.iter().position(|t| t == tile);
        if queued.is_none() && batched.is_none() {
            return false;
        }
        if let Some(index) = queued {
            self.state.pending_show.remove(index);
        }
        if let Some(index) = batched {
            self.state.show_batch.remove(index);
        }

        match self.state.phase {
            Phase::Hide | Phase::Layout => {
                self.state.withdrawn.push(tile.clone());
                true
            }
            Phase::None | Phase::Show => {
                self.complete_show_effects(tile);
                self.advance_if_shown();
                false
            }
        }
    }

    fn start_cycle(&mut self) {
        debug_assert_eq!(self.state.phase, Phase::None);
        self.state.queued_relayout = false;
        self.with_metrics(CycleMetrics::record_cycle);
        self.audit(
            CycleAuditStage::CycleStarted,
            [
                json_kv("hide", json!(self.state.pending_hide.len())),
                json_kv("show", json!(self.state.pending_show.len())),
                json_kv("resize", json!(self.state.pending_resize.len())),
            ],
        );
        self.listener.on_cycle_starting();

        if self.state.pending_hide.is_empty() {
            self.enter_layout();
        } else {
            self.enter_hide();
        }
    }

    fn enter_hide(&mut self) {
        self.state.phase = Phase::Hide;
        let batch = std::mem::take(&mut self.state.pending_hide);
        self.log_phase([json_kv("tiles", json!(batch.len()))]);
        self.audit(
            CycleAuditStage::HideStarted,
            [json_kv("tiles", json!(batch.len()))],
        );
        self.begin_hiding(batch);
        self.advance_if_hidden();
    }

    fn begin_hiding(&mut self, batch: Vec<T>) {
        let animate = self.is_animation_enabled();
        let hide_from = self.config.settings.style_classes.hide_from.clone();
        for tile in batch {
            self.state.hiding.push(tile.clone());
            if animate {
                self.host.add_style_class(&tile, &hide_from);
                self.state.hide_staged.push(tile);
            } else {
                self.complete_hide(&tile);
            }
        }

        if !self.state.hide_staged.is_empty() && self.state.hide_commit.is_none() {
            let task = self.state.next_task(DeferredKind::HideCommit);
            self.state.hide_commit = Some(task);
            self.host.schedule_deferred(task);
        }
    }

    fn complete_hide(&mut self, tile: &T) {
        self.state.hiding.retain(|t| t != tile);
        self.state.hide_staged.retain(|t| t != tile);
        self.state.hide_armed.remove(tile);
        if self.support.is_enabled() {
            let classes = self.config.settings.style_classes.clone();
            for class in [
                &classes.hide_from,
                &classes.hide_to,
                &classes.show_from,
                &classes.show_to,
            ] {
                self.host.remove_style_class(tile, class);
            }
        }

        self.host.notify_detached(tile);
        self.host.detach_tile(tile);
        self.order.remove(tile);
        self.placements.remove(tile);
        self.state.prior_spans.remove(tile);

        self.listener.on_tile_hidden(tile);
        self.with_metrics(CycleMetrics::record_hidden);
        self.audit(
            CycleAuditStage::TileHidden,
            [json_kv("tile", Self::describe(tile))],
        );
    }

    fn advance_if_hidden(&mut self) {
        if self.state.phase == Phase::Hide && self.state.hiding.is_empty() {
            self.cancel_hide_commit();
            self.enter_layout();
        }
    }

    fn enter_layout(&mut self) {
        self.state.phase = Phase::Layout;
        let inserted = std::mem::take(&mut self.state.pending_show);
        self.state.show_batch.extend(inserted);

        for (tile, span) in std::mem::take(&mut self.state.pending_resize) {
            let prior = self.host.span(&tile);
            self.state.prior_spans.entry(tile.clone()).or_insert(prior);
            self.host.apply_span(&tile, span);
            self.state.resizing.insert(tile);
        }

        let animate = self.is_animation_enabled();
        let (result, placements, moved) = self.compute_layout();
        let transition = self.config.settings.style_classes.transition.clone();

        for (tile, placement) in placements {
            if animate && moved.contains(&tile) {
                self.host.add_style_class(&tile, &transition);
                self.state.animating.push(tile.clone());
                self.state.moved.insert(tile.clone());
            }
            self.host.place_tile(&tile, &placement);
            self.placements.insert(tile, placement);
        }
        self.host.set_container_extent(result.extent());

        self.with_metrics(|metrics| metrics.record_layout(moved.len()));
        self.log_phase([
            json_kv("columns", json!(result.columns)),
            json_kv("rows", json!(result.rows)),
            json_kv("moved", json!(moved.len())),
            json_kv("animated", json!(animate)),
        ]);
        self.audit(
            CycleAuditStage::LayoutPacked,
            [
                json_kv("columns", json!(result.columns)),
                json_kv("rows", json!(result.rows)),
                json_kv("moved", json!(moved.len())),
            ],
        );
        self.fingerprint = Some(result.fingerprint());
        self.last_pack = Some(result);

        if self.state.moved.is_empty() {
            self.finish_layout_phase();
        }
    }

    /// Pack the live tiles in original order and work out which ones moved.
    fn compute_layout(&self) -> (PackResult<T>, Vec<(T, TilePlacement)>, Vec<T>) {
        let live: Vec<T> = self
            .host
            .tiles()
            .into_iter()
            .filter(|tile| !self.state.hiding.contains(tile))
            .collect();
        let ordered = self.order.sorted(&live);
        let Some(first) = ordered.first() else {
            return (PackResult::empty(), Vec::new(), Vec::new());
        };

        // The first tile measures at the span it was last rendered with: the
        // clamped span of the previous pass, or its old span while resizing.
        let rendered = self
            .last_pack
            .as_ref()
            .filter(|_| self.placements.contains_key(first))
            .and_then(|previous| previous.span_of(first));
        let cell_span = rendered
            .or_else(|| self.state.prior_spans.get(first).copied())
            .unwrap_or_else(|| self.host.span(first));
        let cell = CellSize::from_measured(self.host.measure(first), cell_span);

        let spans: Vec<(T, Span)> = ordered
            .iter()
            .map(|tile| (tile.clone(), self.host.span(tile)))
            .collect();
        let result = pack(&spans, cell, self.host.container_width());

        let edge = self.config.settings.direction.inline_edge();
        let mut placements = Vec::with_capacity(result.tiles.len());
        let mut moved = Vec::new();
        for packed in &result.tiles {
            let placement = result.placement(packed, edge);
            let has_moved = match self.placements.get(&packed.tile) {
                Some(previous) => {
                    placement.moved_from(previous) || self.state.resizing.contains(&packed.tile)
                }
                None => false,
            };
            if has_moved {
                moved.push(packed.tile.clone());
            }
            placements.push((packed.tile.clone(), placement));
        }

        (result, placements, moved)
    }

    fn finish_layout_phase(&mut self) {
        let transition = self.config.settings.style_classes.transition.clone();
        for tile in std::mem::take(&mut self.state.animating) {
            self.host.remove_style_class(&tile, &transition);
        }
        self.state.moved.clear();
        self.state.resizing.clear();
        self.state.prior_spans.clear();

        self.listener.on_layout_settled();
        self.audit(CycleAuditStage::LayoutSettled, std::iter::empty());
        // Withdrawn tiles keep show-from until their hide detaches them.
        for tile in std::mem::take(&mut self.state.withdrawn) {
            self.report_shown(&tile);
        }

        if self.state.show_batch.is_empty() {
            self.end_cycle();
        } else {
            self.enter_show();
        }
    }

    fn enter_show(&mut self) {
        self.state.phase = Phase::Show;
        self.log_phase([json_kv("tiles", json!(self.state.show_batch.len()))]);
        self.audit(
            CycleAuditStage::ShowStarted,
            [json_kv("tiles", json!(self.state.show_batch.len()))],
        );

        if self.is_animation_enabled() {
            let task = self.state.next_task(DeferredKind::ShowPreparation);
            self.state.show_preparation = Some(task);
            self.host.schedule_deferred(task);
        } else {
            for tile in self.state.show_batch.clone() {
                self.complete_show(&tile);
            }
            self.advance_if_shown();
        }
    }

    fn arm_show(&mut self) {
        self.state.show_armed = true;
        let classes = self.config.settings.style_classes.clone();
        for tile in &self.state.show_batch {
            self.host.remove_style_class(tile, &classes.show_from);
            self.host.add_style_class(tile, &classes.show_to);
        }
    }

    fn complete_show(&mut self, tile: &T) {
        self.state.show_batch.retain(|t| t != tile);
        self.complete_show_effects(tile);
    }

    fn complete_show_effects(&mut self, tile: &T) {
        if self.support.is_enabled() {
            let classes = self.config.settings.style_classes.clone();
            self.host.remove_style_class(tile, &classes.show_from);
            self.host.remove_style_class(tile, &classes.show_to);
        }
        self.report_shown(tile);
    }

    fn report_shown(&mut self, tile: &T) {
        self.listener.on_tile_shown(tile);
        self.with_metrics(CycleMetrics::record_shown);
        self.audit(
            CycleAuditStage::TileShown,
            [json_kv("tile", Self::describe(tile))],
        );
    }

    fn advance_if_shown(&mut self) {
        if self.state.phase == Phase::Show && self.state.show_batch.is_empty() {
            self.cancel_show_preparation();
            self.end_cycle();
        }
    }

    fn end_cycle(&mut self) {
        self.state.phase = Phase::None;
        self.state.show_armed = false;
        if self.state.reconcile_order {
            self.state.reconcile_order = false;
            self.reconcile_visual_order();
        }

        self.log_phase(std::iter::empty());
        self.audit(CycleAuditStage::CycleEnded, std::iter::empty());
        self.listener.on_cycle_ended();

        if self.state.has_pending_work() {
            self.start_cycle();
        }
    }

    /// Rewrite host child order so it follows the packed reading order.
    fn reconcile_visual_order(&mut self) {
        let visual = match self.last_pack.as_ref() {
            Some(result) => result.visual_order(),
            None => return,
        };
        let mut children = self.host.tiles();
        let mut repositioned = 0usize;

        for (index, tile) in visual.iter().enumerate() {
            if children.get(index) == Some(tile) {
                continue;
            }
            let Some(current) = children.iter().position(|child| child == tile) else {
                continue;
            };
            self.host.notify_detached(tile);
            self.host.reposition_tile(tile, index);
            self.host.notify_attached(tile);
            let child = children.remove(current);
            children.insert(index.min(children.len()), child);
            repositioned += 1;
        }

        if repositioned > 0 {
            self.audit(
                CycleAuditStage::OrderReconciled,
                [json_kv("repositioned", json!(repositioned))],
            );
        }
    }

    fn cancel_hide_commit(&mut self) {
        if let Some(task) = self.state.hide_commit.take() {
            self.host.cancel_deferred(task);
        }
        self.state.hide_staged.clear();
    }

    fn cancel_show_preparation(&mut self) {
        if let Some(task) = self.state.show_preparation.take() {
            self.host.cancel_deferred(task);
        }
    }

    fn ignore_transition(&self, tile: &T, phase: Phase) {
        self.log(
            LogLevel::Trace,
            "transition_ignored",
            [
                json_kv("tile", Self::describe(tile)),
                json_kv("reported", json!(phase.as_str())),
                json_kv("active", json!(self.state.phase.as_str())),
            ],
        );
    }

    fn describe(tile: &T) -> Value {
        json!(format!("{:?}", tile))
    }

    fn log_phase<I>(&self, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let phase = json_kv("phase", json!(self.state.phase.as_str()));
        self.log(
            LogLevel::Debug,
            "phase_entered",
            std::iter::once(phase).chain(fields),
        );
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            if !logger.enabled(level) {
                return;
            }
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn audit<I>(&self, stage: CycleAuditStage, details: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut builder = CycleAuditEventBuilder::new(stage);
        for (key, value) in details {
            builder.detail(key, value);
        }
        self.config.audit.record(builder.finish());
    }

    fn with_metrics(&self, record: impl FnOnce(&mut CycleMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }
}
