//! Context limits and timing, loaded once at startup.
//!
//! ```toml
//! [limits]
//! max_focusable = 512
//!
//! [timing]
//! double_click_time = 0.35
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, InitError};

/// Capacities of every fixed engine table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Windows per frame.
    pub max_windows: usize,
    /// Nested open boxes.
    pub max_box_depth: usize,
    /// Children per box.
    pub max_box_children: usize,
    /// Input layers per frame.
    pub max_layers: usize,
    /// Blocking regions per frame.
    pub max_blocking_regions: usize,
    /// Focusable widgets per frame.
    pub max_focusable: usize,
    /// Clip stack depth, window base included.
    pub max_clip_depth: usize,
    /// ID stack depth.
    pub max_id_depth: usize,
    /// Identities tracked for liveness per frame.
    pub max_live_ids: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_windows: 16,
            max_box_depth: 16,
            max_box_children: 32,
            max_layers: 16,
            max_blocking_regions: 64,
            max_focusable: 256,
            max_clip_depth: 32,
            max_id_depth: 32,
            max_live_ids: 1024,
        }
    }
}

impl Limits {
    /// Checks every limit is non-zero.
    ///
    /// # Errors
    ///
    /// [`InitError::InvalidLimits`] naming the first zero field.
    pub fn validate(&self) -> Result<(), InitError> {
        let fields = [
            ("max_windows", self.max_windows),
            ("max_box_depth", self.max_box_depth),
            ("max_box_children", self.max_box_children),
            ("max_layers", self.max_layers),
            ("max_blocking_regions", self.max_blocking_regions),
            ("max_focusable", self.max_focusable),
            ("max_clip_depth", self.max_clip_depth),
            ("max_id_depth", self.max_id_depth),
            ("max_live_ids", self.max_live_ids),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some(&(field, _)) => Err(InitError::InvalidLimits { field }),
            None => Ok(()),
        }
    }
}

/// Time and distance thresholds for UI affordances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Max seconds between presses counted as one multi-click.
    pub double_click_time: f64,
    /// Max pointer travel (per axis) between presses of one multi-click.
    pub click_tolerance: f32,
    /// Hover seconds before a tooltip shows.
    pub tooltip_delay: f32,
    /// Caret blink half-period in seconds.
    pub caret_blink: f32,
    /// Frames an opening overlay ignores outside clicks.
    pub overlay_settle_frames: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            double_click_time: 0.4,
            click_tolerance: 4.0,
            tooltip_delay: 0.5,
            caret_blink: 0.53,
            overlay_settle_frames: 1,
        }
    }
}

impl Timing {
    /// Checks thresholds are finite and non-negative.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("double_click_time", self.double_click_time),
            ("click_tolerance", f64::from(self.click_tolerance)),
            ("tooltip_delay", f64::from(self.tooltip_delay)),
            ("caret_blink", f64::from(self.caret_blink)),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("timing.{field} = {value}")));
            }
        }
        Ok(())
    }
}

/// Everything needed to size and tune a context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Table capacities.
    pub limits: Limits,
    /// Affordance thresholds.
    pub timing: Timing,
}

impl ContextConfig {
    /// Parses a config from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on bad syntax, [`ConfigError::Invalid`] on bad
    /// values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ContextConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded context config");
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn check(&self) -> ConfigResult<()> {
        self.limits
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.timing.validate()
    }
}
