//! Layout-cycle audit hooks.
//!
//! Callers that want a structured trace of phase transitions install a
//! `CycleAudit` sink on the engine config. Each record carries a stage plus
//! free-form details so it can be logged or buffered without touching the
//! state machine itself.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Checkpoints emitted while a layout cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAuditStage {
    /// A cycle left NONE.
    CycleStarted,
    /// The HIDE phase began with a batch of tiles.
    HideStarted,
    /// A tile finished hiding and was detached.
    TileHidden,
    /// The packer produced a new arrangement.
    LayoutPacked,
    /// All moved tiles finished transitioning.
    LayoutSettled,
    /// The SHOW phase began.
    ShowStarted,
    /// A tile finished its reveal.
    TileShown,
    /// The cycle returned to NONE.
    CycleEnded,
    /// `finish_layout_cycle` forced the active cycle to completion.
    FastForwarded,
    /// Host child order was rewritten to match the packed order.
    OrderReconciled,
}

#[derive(Debug, Clone)]
pub struct CycleAuditEvent {
    pub timestamp: SystemTime,
    pub stage: CycleAuditStage,
    pub details: Vec<(String, Value)>,
}

impl CycleAuditEvent {
    fn new(stage: CycleAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }
}

pub struct CycleAuditEventBuilder {
    event: CycleAuditEvent,
}

impl CycleAuditEventBuilder {
    pub fn new(stage: CycleAuditStage) -> Self {
        Self {
            event: CycleAuditEvent::new(stage),
        }
    }

    pub fn detail(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> CycleAuditEvent {
        self.event
    }
}

pub trait CycleAudit: Send + Sync {
    fn record(&self, event: CycleAuditEvent);
}

#[derive(Debug, Default)]
pub struct NullCycleAudit;

impl CycleAudit for NullCycleAudit {
    fn record(&self, _event: CycleAuditEvent) {}
}

/// Buffers every record; handy for asserting stage order.
#[derive(Debug, Default)]
pub struct BufferedCycleAudit {
    events: Mutex<Vec<CycleAuditEvent>>,
}

impl BufferedCycleAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<CycleAuditStage> {
        self.events
            .lock()
            .map(|guard| guard.iter().map(|e| e.stage).collect())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<CycleAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CycleAudit for BufferedCycleAudit {
    fn record(&self, event: CycleAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_details() {
        let mut builder = CycleAuditEventBuilder::new(CycleAuditStage::LayoutPacked);
        builder.detail("rows", json!(2)).detail("columns", json!(3));
        let event = builder.finish();
        assert_eq!(event.stage, CycleAuditStage::LayoutPacked);
        assert_eq!(event.details.len(), 2);
        assert_eq!(event.details[0], ("rows".to_string(), json!(2)));
    }

    #[test]
    fn buffered_audit_keeps_order() {
        let audit = BufferedCycleAudit::new();
        audit.record(CycleAuditEventBuilder::new(CycleAuditStage::CycleStarted).finish());
        audit.record(CycleAuditEventBuilder::new(CycleAuditStage::CycleEnded).finish());
        assert_eq!(
            audit.stages(),
            vec![CycleAuditStage::CycleStarted, CycleAuditStage::CycleEnded]
        );
    }
}
