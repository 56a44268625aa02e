use std::fs;
use std::path::Path;

use mandelview_core::{Viewport, Waypoint};
use mandelview_render::{ColorWeights, MIN_PALETTE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Explorer settings persisted as JSON next to the executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,

    /// Number of palette entries used at start-up and on Home.
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,
    #[serde(default)]
    pub color_weights: WeightsConfig,

    /// Shift the previous frame and render only the exposed strips when scrolling.
    #[serde(default = "default_true")]
    pub fast_scroll: bool,
    /// Render worker count. `None` uses the available parallelism.
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Home position. `None` frames the whole set in the initial window.
    #[serde(default)]
    pub home: Option<Waypoint>,
    #[serde(default)]
    pub restore_last_view: bool,
    #[serde(default)]
    pub last_view: Option<Waypoint>,
}

/// Serialized form of [`ColorWeights`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        ColorWeights::default().into()
    }
}

impl From<ColorWeights> for WeightsConfig {
    fn from(w: ColorWeights) -> Self {
        Self {
            r: w.r,
            g: w.g,
            b: w.b,
        }
    }
}

impl From<WeightsConfig> for ColorWeights {
    fn from(w: WeightsConfig) -> Self {
        ColorWeights::new(w.r, w.g, w.b)
    }
}

fn default_window_width() -> f32 {
    800.0
}
fn default_window_height() -> f32 {
    600.0
}
fn default_palette_size() -> usize {
    32
}
fn default_true() -> bool {
    true
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            palette_size: default_palette_size(),
            color_weights: WeightsConfig::default(),
            fast_scroll: true,
            concurrency: None,
            home: None,
            restore_last_view: false,
            last_view: None,
        }
    }
}

impl ExplorerConfig {
    /// Load the configuration from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&crate::app_dir::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No configuration file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    return config;
                }
                Err(e) => error!("Failed to parse configuration: {e}"),
            },
            Err(e) => error!("Failed to read configuration file: {e}"),
        }
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Persist the configuration next to the executable.
    pub fn save(&self) {
        self.save_to(&crate::app_dir::config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write configuration: {e}");
                } else {
                    debug!("Saved configuration to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize configuration: {e}"),
        }
    }

    pub fn weights(&self) -> ColorWeights {
        self.color_weights.into()
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size.max(MIN_PALETTE_SIZE)
    }

    /// The configured home, or the default framing for a window `width` pixels wide.
    pub fn home_waypoint(&self, width: u32) -> Waypoint {
        if let Some(home) = self.home {
            match home.validate() {
                Ok(()) => return home,
                Err(e) => warn!("Ignoring configured home: {e}"),
            }
        }
        Viewport::home(width).into()
    }

    /// Where the explorer should open: the saved view when restoring is enabled
    /// and the snapshot is usable, otherwise home.
    pub fn start_waypoint(&self, width: u32) -> Waypoint {
        if self.restore_last_view {
            if let Some(last) = self.last_view {
                match last.validate() {
                    Ok(()) => return last,
                    Err(e) => warn!("Ignoring saved view: {e}"),
                }
            }
        }
        self.home_waypoint(width)
    }
}
