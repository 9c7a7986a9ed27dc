use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated across layout cycles.
#[derive(Debug, Default, Clone)]
pub struct CycleMetrics {
    cycles: u64,
    layout_passes: u64,
    tiles_moved: u64,
    tiles_hidden: u64,
    tiles_shown: u64,
    fast_forwards: u64,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }

    pub fn record_layout(&mut self, moved: usize) {
        self.layout_passes = self.layout_passes.saturating_add(1);
        self.tiles_moved = self.tiles_moved.saturating_add(moved as u64);
    }

    pub fn record_hidden(&mut self) {
        self.tiles_hidden = self.tiles_hidden.saturating_add(1);
    }

    pub fn record_shown(&mut self) {
        self.tiles_shown = self.tiles_shown.saturating_add(1);
    }

    pub fn record_fast_forward(&mut self) {
        self.fast_forwards = self.fast_forwards.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            cycles: self.cycles,
            layout_passes: self.layout_passes,
            tiles_moved: self.tiles_moved,
            tiles_hidden: self.tiles_hidden,
            tiles_shown: self.tiles_shown,
            fast_forwards: self.fast_forwards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub cycles: u64,
    pub layout_passes: u64,
    pub tiles_moved: u64,
    pub tiles_hidden: u64,
    pub tiles_shown: u64,
    pub fast_forwards: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "cycle_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("cycles".to_string(), json!(self.cycles));
        map.insert("layout_passes".to_string(), json!(self.layout_passes));
        map.insert("tiles_moved".to_string(), json!(self.tiles_moved));
        map.insert("tiles_hidden".to_string(), json!(self.tiles_hidden));
        map.insert("tiles_shown".to_string(), json!(self.tiles_shown));
        map.insert("fast_forwards".to_string(), json!(self.fast_forwards));
        map
    }
}
