//! Fixtures
//!
//! Named taste-profile presets read from YAML, e.g. `fixtures/profiles/house.yml`:
//!
//! ```yaml
//! profiles:
//!   morning-pour:
//!     name: Morning Pour
//!     bitterness: 3
//!     acidity: 2
//!     body: 4
//!     flavour: 3
//!     roast_level: medium
//!     grind_type: pour-over
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::profiles::{GrindType, ProfileError, RoastLevel, Sensory, TasteProfile};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A preset holds values a profile cannot take
    #[error("Invalid preset {key}: {source}")]
    Profile {
        /// Preset key
        key: String,
        /// Underlying validation error
        #[source]
        source: ProfileError,
    },

    /// Preset not found
    #[error("Preset not found: {0}")]
    PresetNotFound(String),
}

#[derive(Debug, Deserialize)]
struct PresetsFixture {
    profiles: BTreeMap<String, PresetFixture>,
}

#[derive(Debug, Clone, Deserialize)]
struct PresetFixture {
    name: String,
    bitterness: u8,
    acidity: u8,
    body: u8,
    flavour: u8,
    roast_level: RoastLevel,
    grind_type: GrindType,
}

/// Validated preset: everything but the id.
#[derive(Debug, Clone)]
struct Preset {
    name: String,
    sensory: Sensory,
    roast_level: RoastLevel,
    grind_type: GrindType,
}

/// Taste-profile presets keyed by a short slug.
#[derive(Debug, Clone, Default)]
pub struct ProfilePresets {
    presets: BTreeMap<String, Preset>,
}

impl ProfilePresets {
    /// Load presets from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a preset holds
    /// values outside the profile scales.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse presets from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or a preset is invalid.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: PresetsFixture = serde_norway::from_str(contents)?;

        let presets = fixture
            .profiles
            .into_iter()
            .map(|(key, preset)| -> Result<(String, Preset), FixtureError> {
                let sensory =
                    Sensory::new(preset.bitterness, preset.acidity, preset.body, preset.flavour)
                        .map_err(|source| FixtureError::Profile {
                            key: key.clone(),
                            source,
                        })?;

                Ok((
                    key,
                    Preset {
                        name: preset.name,
                        sensory,
                        roast_level: preset.roast_level,
                        grind_type: preset.grind_type,
                    },
                ))
            })
            .collect::<Result<_, FixtureError>>()?;

        Ok(Self { presets })
    }

    /// Build a profile from the preset `key`; each call yields a fresh profile id.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::PresetNotFound`] for an unknown key.
    pub fn get(&self, key: &str) -> Result<TasteProfile, FixtureError> {
        let preset = self
            .presets
            .get(key)
            .ok_or_else(|| FixtureError::PresetNotFound(key.to_string()))?;

        Ok(TasteProfile::new(
            preset.name.clone(),
            preset.sensory,
            preset.roast_level,
            preset.grind_type,
        ))
    }

    /// Preset keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether no presets were loaded.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
