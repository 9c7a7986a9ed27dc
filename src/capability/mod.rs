//! Animation capability detection.
//!
//! The engine asks once, at construction, whether the hosting renderer can run
//! CSS-style transitions. When it cannot, every phase completes synchronously.

use serde::{Deserialize, Serialize};

/// Rendering engine family reported by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingEngine {
    Gecko,
    WebKit,
    Blink,
    Trident,
    Other,
}

/// Description of the environment the engine is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub engine: RenderingEngine,
    pub version: f32,
    /// Set under automated test runs; animations are always skipped.
    pub automation: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            engine: RenderingEngine::Blink,
            version: 1.0,
            automation: false,
        }
    }
}

impl Environment {
    pub fn new(engine: RenderingEngine, version: f32) -> Self {
        Self {
            engine,
            version,
            automation: false,
        }
    }

    pub fn automated(mut self) -> Self {
        self.automation = true;
        self
    }
}

/// Minimum engine versions with transition support. `None` means unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityTable {
    pub gecko: Option<f32>,
    pub webkit: Option<f32>,
    pub blink: Option<f32>,
    pub trident: Option<f32>,
    pub other: Option<f32>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self {
            gecko: Some(4.0),
            webkit: Some(525.0),
            blink: Some(1.0),
            trident: Some(10.0),
            other: None,
        }
    }
}

impl CapabilityTable {
    pub fn minimum(&self, engine: RenderingEngine) -> Option<f32> {
        match engine {
            RenderingEngine::Gecko => self.gecko,
            RenderingEngine::WebKit => self.webkit,
            RenderingEngine::Blink => self.blink,
            RenderingEngine::Trident => self.trident,
            RenderingEngine::Other => self.other,
        }
    }

    pub fn supports(&self, env: &Environment) -> bool {
        self.minimum(env.engine)
            .map(|min| env.version >= min)
            .unwrap_or(false)
    }
}

/// Cached result of capability detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSupport {
    Enabled,
    Disabled,
}

impl AnimationSupport {
    pub fn detect(env: &Environment, table: &CapabilityTable) -> Self {
        if env.automation || !table.supports(env) {
            AnimationSupport::Disabled
        } else {
            AnimationSupport::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, AnimationSupport::Enabled)
    }
}
