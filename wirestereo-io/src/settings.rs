//! JSON settings file: detector geometry plus reconstruction parameters.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wirestereo_core::{ChamberGeometry, ReconstructionConfig};

/// Everything a reconstruction run needs besides the events.
///
/// Missing sections and fields fall back to their defaults, so an empty
/// object `{}` is a valid settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Detector geometry and drift properties.
    pub geometry: ChamberGeometry,
    /// Reconstruction parameters.
    pub reconstruction: ReconstructionConfig,
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// loaded values fail validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        log::debug!("loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Writes the settings as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Validates geometry and reconstruction parameters.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.reconstruction.validate()?;
        Ok(())
    }
}
