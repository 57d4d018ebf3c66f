//! Runtime configuration for the demo.

use std::path::PathBuf;

use colorsense_core::CalibrationSettings;

use crate::DemoError;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration for the colorsense demo.
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    /// JSON settings document applied before capture (`COLORSENSE_SETTINGS`).
    pub settings_path: Option<PathBuf>,
    /// Print the effective settings as JSON (`COLORSENSE_DUMP_SETTINGS`).
    pub dump_settings: bool,
}

impl DemoConfig {
    pub fn from_env() -> Self {
        Self {
            settings_path: std::env::var_os("COLORSENSE_SETTINGS").map(PathBuf::from),
            dump_settings: std::env::var("COLORSENSE_DUMP_SETTINGS").is_ok(),
        }
    }

    /// Settings from the configured file, or the defaults.
    pub fn load_settings(&self) -> Result<CalibrationSettings, DemoError> {
        let Some(path) = &self.settings_path else {
            return Ok(CalibrationSettings::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| DemoError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded calibration settings");
        Ok(CalibrationSettings::from_json(&json)?)
    }
}
