//! Masonry grid packing and layout-cycle engine.
//!
//! Tiles of arbitrary cell spans are packed first-fit into a grid whose width
//! follows the container. Mutations (insert, hide, resize) are folded into an
//! animated `HIDE -> LAYOUT -> SHOW` cycle driven by an embedding host that
//! supplies measuring, styling and scheduling capabilities.

pub mod capability;
pub mod cycle;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod order;

pub use capability::{AnimationSupport, CapabilityTable, Environment, RenderingEngine};
pub use cycle::audit::{
    BufferedCycleAudit, CycleAudit, CycleAuditEvent, CycleAuditEventBuilder, CycleAuditStage,
    NullCycleAudit,
};
pub use cycle::{
    EngineConfig, EngineSettings, LayoutCycleState, LogFileSettings, MasonryEngine, Phase,
    StyleClasses,
};
pub use error::{MasonryError, Result};
pub use geometry::{CellSize, Direction, Edge, Size, Span};
pub use host::{
    CycleListener, DeferredKind, DeferredTask, HostCall, LayoutHost, ListenerCall, NullListener,
    RecordingHost, RecordingListener, TileHandle,
};
pub use layout::{GridPosition, OccupancyMap, PackResult, PackedTile, TilePlacement, pack};
pub use logging::{FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink};
pub use metrics::{CycleMetrics, MetricSnapshot};
pub use order::OrderBook;
