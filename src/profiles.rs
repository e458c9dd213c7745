//! Taste Profiles
//!
//! A taste profile describes a custom coffee blend: four sensory sliders plus a
//! roast level and a grind type. Profiles are values; once built they are never
//! mutated, only copied into cart lines.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Taste Profile UUID
pub type TasteProfileUuid = TypedUuid<TasteProfile>;

/// Errors raised while building a taste profile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A sensory value fell outside the supported scale.
    #[error("intensity {0} is outside the 1..=5 scale")]
    IntensityOutOfRange(u8),

    /// The roast level name was not recognised.
    #[error("unknown roast level: {0}")]
    UnknownRoastLevel(String),

    /// The grind type name was not recognised.
    #[error("unknown grind type: {0}")]
    UnknownGrindType(String),
}

/// A sensory value on the fixed `1..=5` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    /// Lowest point on the scale.
    pub const MIN: u8 = 1;

    /// Highest point on the scale.
    pub const MAX: u8 = 5;

    /// Validate a raw slider value.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::IntensityOutOfRange`] when `value` is off the scale.
    pub fn new(value: u8) -> Result<Self, ProfileError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(ProfileError::IntensityOutOfRange(value));
        }

        Ok(Self(value))
    }

    /// Raw slider value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = ProfileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

impl Display for Intensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// The four sensory sliders of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sensory {
    /// Bitterness
    pub bitterness: Intensity,

    /// Acidity
    pub acidity: Intensity,

    /// Body
    pub body: Intensity,

    /// Flavour
    pub flavour: Intensity,
}

impl Sensory {
    /// Build the sliders from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::IntensityOutOfRange`] for the first value off the scale.
    pub fn new(bitterness: u8, acidity: u8, body: u8, flavour: u8) -> Result<Self, ProfileError> {
        Ok(Self {
            bitterness: Intensity::new(bitterness)?,
            acidity: Intensity::new(acidity)?,
            body: Intensity::new(body)?,
            flavour: Intensity::new(flavour)?,
        })
    }
}

/// Roast level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoastLevel {
    /// Light roast
    Light,

    /// Medium roast
    Medium,

    /// Balanced roast
    Balanced,
}

impl RoastLevel {
    /// Every roast level, in display order.
    pub const ALL: [Self; 3] = [Self::Light, Self::Medium, Self::Balanced];

    /// Stable name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Balanced => "balanced",
        }
    }
}

impl Display for RoastLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoastLevel {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProfileError::UnknownRoastLevel(s.to_string()))
    }
}

/// Grind type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrindType {
    /// Whole beans, no grinding
    WholeBean,

    /// Espresso machine
    Espresso,

    /// Moka pot
    MokaPot,

    /// French press
    FrenchPress,

    /// Pour over
    PourOver,

    /// Filter machine
    Filter,
}

impl GrindType {
    /// Every grind type, in display order.
    pub const ALL: [Self; 6] = [
        Self::WholeBean,
        Self::Espresso,
        Self::MokaPot,
        Self::FrenchPress,
        Self::PourOver,
        Self::Filter,
    ];

    /// Stable name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WholeBean => "whole-bean",
            Self::Espresso => "espresso",
            Self::MokaPot => "moka-pot",
            Self::FrenchPress => "french-press",
            Self::PourOver => "pour-over",
            Self::Filter => "filter",
        }
    }
}

impl Display for GrindType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrindType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|grind| grind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProfileError::UnknownGrindType(s.to_string()))
    }
}

/// Everything that makes two profiles the same coffee.
///
/// Two profiles with equal blends share a single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blend {
    /// Sensory sliders
    pub sensory: Sensory,

    /// Roast level
    pub roast_level: RoastLevel,

    /// Grind type
    pub grind_type: GrindType,
}

impl Display for Blend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Sensory {
            bitterness,
            acidity,
            body,
            flavour,
        } = self.sensory;

        write!(
            f,
            "B{bitterness} A{acidity} Bo{body} F{flavour} / {} / {}",
            self.roast_level, self.grind_type
        )
    }
}

/// Taste Profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    id: TasteProfileUuid,
    name: String,
    bitterness: Intensity,
    acidity: Intensity,
    body: Intensity,
    flavour: Intensity,
    roast_level: RoastLevel,
    grind_type: GrindType,
}

impl TasteProfile {
    /// Create a profile with a fresh id.
    pub fn new(
        name: impl Into<String>,
        sensory: Sensory,
        roast_level: RoastLevel,
        grind_type: GrindType,
    ) -> Self {
        Self {
            id: TasteProfileUuid::new(),
            name: name.into(),
            bitterness: sensory.bitterness,
            acidity: sensory.acidity,
            body: sensory.body,
            flavour: sensory.flavour,
            roast_level,
            grind_type,
        }
    }

    /// The same profile under another id.
    #[must_use]
    pub fn with_id(self, id: TasteProfileUuid) -> Self {
        Self { id, ..self }
    }

    /// Profile id
    pub fn id(&self) -> TasteProfileUuid {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sensory sliders
    pub fn sensory(&self) -> Sensory {
        Sensory {
            bitterness: self.bitterness,
            acidity: self.acidity,
            body: self.body,
            flavour: self.flavour,
        }
    }

    /// Roast level
    pub fn roast_level(&self) -> RoastLevel {
        self.roast_level
    }

    /// Grind type
    pub fn grind_type(&self) -> GrindType {
        self.grind_type
    }

    /// The equivalence key of this profile; `id` and `name` are not part of it.
    pub fn blend(&self) -> Blend {
        Blend {
            sensory: self.sensory(),
            roast_level: self.roast_level,
            grind_type: self.grind_type,
        }
    }

    /// Whether `other` describes the same coffee.
    pub fn is_equivalent(&self, other: &TasteProfile) -> bool {
        self.blend() == other.blend()
    }
}
