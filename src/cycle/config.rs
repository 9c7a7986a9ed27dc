use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityTable, Environment};
use crate::error::Result;
use crate::geometry::Direction;
use crate::logging::{FileSink, Logger};
use crate::metrics::CycleMetrics;

use super::audit::{CycleAudit, NullCycleAudit};

/// Style class names applied to tiles during each phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleClasses {
    pub hide_from: String,
    pub hide_to: String,
    pub show_from: String,
    pub show_to: String,
    /// Present on tiles while a move/resize transition runs.
    pub transition: String,
}

impl Default for StyleClasses {
    fn default() -> Self {
        Self {
            hide_from: "af_masonryLayout_tile-hide-from".to_string(),
            hide_to: "af_masonryLayout_tile-hide-to".to_string(),
            show_from: "af_masonryLayout_tile-show-from".to_string(),
            show_to: "af_masonryLayout_tile-show-to".to_string(),
            transition: "af_masonryLayout_tile-transition".to_string(),
        }
    }
}

/// JSON-lines log file opened by `EngineConfig::from_settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileSettings {
    pub path: PathBuf,
    /// Truncate once a write would pass this size; 0 never truncates.
    #[serde(default)]
    pub max_bytes: u64,
}

/// Serializable engine knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub direction: Direction,
    pub style_classes: StyleClasses,
    pub capability_table: CapabilityTable,
    pub environment: Environment,
    pub log_file: Option<LogFileSettings>,
}

impl EngineSettings {
    /// Parse settings from JSON; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Runtime configuration handed to `MasonryEngine::new`.
#[derive(Clone)]
pub struct EngineConfig {
    pub settings: EngineSettings,
    /// Optional structured logger used by the engine.
    pub logger: Option<Logger>,
    /// Shared counters, if collection is enabled.
    pub metrics: Option<Arc<Mutex<CycleMetrics>>>,
    /// Target field used for engine log events.
    pub log_target: String,
    pub audit: Arc<dyn CycleAudit>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
            logger: None,
            metrics: None,
            log_target: "masonry::cycle".to_string(),
            audit: Arc::new(NullCycleAudit),
        }
    }
}

impl EngineConfig {
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Build a config from settings, opening the log file they name.
    pub fn from_settings(settings: EngineSettings) -> Result<Self> {
        let log_file = settings.log_file.clone();
        let config = Self::with_settings(settings);
        match log_file {
            Some(file) => config.with_log_file(&file.path, file.max_bytes),
            None => Ok(config),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_log_file(self, path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let sink = FileSink::new(path, max_bytes)?;
        Ok(self.with_logger(Logger::new(sink)))
    }

    pub fn with_audit(mut self, audit: Arc<dyn CycleAudit>) -> Self {
        self.audit = audit;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(CycleMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<CycleMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RenderingEngine;
    use crate::logging::{LogLevel, LoggingError};
    use crate::MasonryError;
    use serde_json::json;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("masonry-{}-{}.jsonl", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn settings_default_when_json_is_empty() {
        let settings = EngineSettings::from_json("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn settings_parse_partial_json() {
        let settings = EngineSettings::from_json(
            r#"{
                "direction": "rtl",
                "style_classes": { "hide_to": "gone" },
                "environment": { "engine": "gecko", "version": 3.5 }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.direction, Direction::Rtl);
        assert_eq!(settings.style_classes.hide_to, "gone");
        assert_eq!(settings.style_classes.hide_from, StyleClasses::default().hide_from);
        assert_eq!(settings.environment.engine, RenderingEngine::Gecko);
        assert!(!settings.environment.automation);
    }

    #[test]
    fn malformed_settings_surface_config_error() {
        let err = EngineSettings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, MasonryError::Config(_)));
    }

    #[test]
    fn settings_open_log_file() {
        let path = temp_log("settings");
        let raw = json!({ "log_file": { "path": path, "max_bytes": 4096 } }).to_string();
        let settings = EngineSettings::from_json(&raw).unwrap();
        assert_eq!(settings.log_file.as_ref().map(|f| f.max_bytes), Some(4096));

        let config = EngineConfig::from_settings(settings).unwrap();
        let logger = config.logger.as_ref().expect("file logger");
        logger.log(LogLevel::Info, "masonry::test", "opened").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"opened\""));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unopenable_log_file_surfaces_logging_error() {
        let path = std::env::temp_dir()
            .join(format!("masonry-missing-{}", std::process::id()))
            .join("engine.jsonl");
        let err = EngineConfig::default()
            .with_log_file(&path, 0)
            .err()
            .expect("parent directory does not exist");
        assert!(matches!(err, MasonryError::Logging(LoggingError::Io(_))));
    }

    #[test]
    fn metrics_toggle() {
        let mut config = EngineConfig::default();
        assert!(config.metrics_handle().is_none());
        config.enable_metrics();
        assert!(config.metrics_handle().is_some());
        config.disable_metrics();
        assert!(config.metrics_handle().is_none());
    }
}
