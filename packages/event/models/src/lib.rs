#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storm event type vocabulary and canonical category definitions.
//!
//! This crate defines the closed set of 48 permitted event types from the
//! NWS Storm Data directive. Every free-text event label in the raw record
//! set is mapped onto one of these types, or onto the
//! [`CanonicalCategory::Unclassifiable`] sentinel.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// Canonical values that mean "could not be confidently classified".
///
/// Compared case-insensitively.
pub const UNCLASSIFIABLE_SENTINELS: &[&str] = &["OTHER", "UNCLASSIFIABLE"];

/// One of the 48 permitted storm event types.
///
/// Parsing is ASCII case-insensitive; display uses the upper-case label as
/// it appears in the NOAA storm database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    EnumCount,
)]
#[strum(ascii_case_insensitive)]
pub enum EventType {
    #[strum(to_string = "ASTRONOMICAL LOW TIDE")]
    AstronomicalLowTide,
    #[strum(to_string = "AVALANCHE")]
    Avalanche,
    #[strum(to_string = "BLIZZARD")]
    Blizzard,
    #[strum(to_string = "COASTAL FLOOD")]
    CoastalFlood,
    #[strum(to_string = "COLD/WIND CHILL")]
    ColdWindChill,
    #[strum(to_string = "DEBRIS FLOW")]
    DebrisFlow,
    #[strum(to_string = "DENSE FOG")]
    DenseFog,
    #[strum(to_string = "DENSE SMOKE")]
    DenseSmoke,
    #[strum(to_string = "DROUGHT")]
    Drought,
    #[strum(to_string = "DUST DEVIL")]
    DustDevil,
    #[strum(to_string = "DUST STORM")]
    DustStorm,
    #[strum(to_string = "EXCESSIVE HEAT")]
    ExcessiveHeat,
    #[strum(to_string = "EXTREME COLD/WIND CHILL")]
    ExtremeColdWindChill,
    #[strum(to_string = "FLASH FLOOD")]
    FlashFlood,
    #[strum(to_string = "FLOOD")]
    Flood,
    #[strum(to_string = "FROST/FREEZE")]
    FrostFreeze,
    #[strum(to_string = "FUNNEL CLOUD")]
    FunnelCloud,
    #[strum(to_string = "FREEZING FOG")]
    FreezingFog,
    #[strum(to_string = "HAIL")]
    Hail,
    #[strum(to_string = "HEAT")]
    Heat,
    #[strum(to_string = "HEAVY RAIN")]
    HeavyRain,
    #[strum(to_string = "HEAVY SNOW")]
    HeavySnow,
    #[strum(to_string = "HIGH SURF")]
    HighSurf,
    #[strum(to_string = "HIGH WIND")]
    HighWind,
    #[strum(to_string = "HURRICANE (TYPHOON)")]
    HurricaneTyphoon,
    #[strum(to_string = "ICE STORM")]
    IceStorm,
    #[strum(to_string = "LAKE-EFFECT SNOW")]
    LakeEffectSnow,
    #[strum(to_string = "LAKESHORE FLOOD")]
    LakeshoreFlood,
    #[strum(to_string = "LIGHTNING")]
    Lightning,
    #[strum(to_string = "MARINE HAIL")]
    MarineHail,
    #[strum(to_string = "MARINE HIGH WIND")]
    MarineHighWind,
    #[strum(to_string = "MARINE STRONG WIND")]
    MarineStrongWind,
    #[strum(to_string = "MARINE THUNDERSTORM WIND")]
    MarineThunderstormWind,
    #[strum(to_string = "RIP CURRENT")]
    RipCurrent,
    #[strum(to_string = "SEICHE")]
    Seiche,
    #[strum(to_string = "SLEET")]
    Sleet,
    #[strum(to_string = "STORM SURGE/TIDE")]
    StormSurgeTide,
    #[strum(to_string = "STRONG WIND")]
    StrongWind,
    #[strum(to_string = "THUNDERSTORM WIND")]
    ThunderstormWind,
    #[strum(to_string = "TORNADO")]
    Tornado,
    #[strum(to_string = "TROPICAL DEPRESSION")]
    TropicalDepression,
    #[strum(to_string = "TROPICAL STORM")]
    TropicalStorm,
    #[strum(to_string = "TSUNAMI")]
    Tsunami,
    #[strum(to_string = "VOLCANIC ASH")]
    VolcanicAsh,
    #[strum(to_string = "WATERSPOUT")]
    Waterspout,
    #[strum(to_string = "WILDFIRE")]
    Wildfire,
    #[strum(to_string = "WINTER STORM")]
    WinterStorm,
    #[strum(to_string = "WINTER WEATHER")]
    WinterWeather,
}

impl EventType {
    /// Returns all event types in declaration order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_str(label.trim()).map_err(|_| {
            serde::de::Error::custom(format!("unknown storm event type '{label}'"))
        })
    }
}

/// Result of mapping a raw event label: a permitted [`EventType`] or the
/// unclassifiable sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalCategory {
    /// A member of the permitted vocabulary.
    Event(EventType),
    /// The raw label could not be confidently matched to any event type.
    Unclassifiable,
}

impl CanonicalCategory {
    /// Returns the event type, or `None` for the unclassifiable sentinel.
    #[must_use]
    pub const fn event_type(self) -> Option<EventType> {
        match self {
            Self::Event(event_type) => Some(event_type),
            Self::Unclassifiable => None,
        }
    }
}

impl std::fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event_type) => event_type.fmt(f),
            Self::Unclassifiable => f.write_str("UNCLASSIFIABLE"),
        }
    }
}

impl FromStr for CanonicalCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if UNCLASSIFIABLE_SENTINELS
            .iter()
            .any(|sentinel| sentinel.eq_ignore_ascii_case(value))
        {
            return Ok(Self::Unclassifiable);
        }
        EventType::from_str(value)
            .map(Self::Event)
            .map_err(|_| ParseCategoryError {
                value: value.to_owned(),
            })
    }
}

/// Error returned when a canonical category label is neither a permitted
/// [`EventType`] nor an unclassifiable sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    /// The label that failed to parse.
    pub value: String,
}

impl std::fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a permitted storm event type or unclassifiable sentinel",
            self.value
        )
    }
}

impl std::error::Error for ParseCategoryError {}
