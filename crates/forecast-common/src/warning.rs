//! Weather warnings and derived severe-weather events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// A weather warning, either from an official alerts feed or synthesized by
/// the severe-weather classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherWarning {
    pub warning_type: String,
    pub description: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub severity: Severity,
}

impl WeatherWarning {
    /// A warning is active while its end time is unset or in the future.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.end_time.map_or(true, |end| end > now)
    }
}

/// Classifier rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ExtremeHeat,
    ExtremeCold,
    HeavyPrecipitation,
    StrongWinds,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::ExtremeHeat => "Extreme Heat",
            EventKind::ExtremeCold => "Extreme Cold",
            EventKind::HeavyPrecipitation => "Heavy Precipitation",
            EventKind::StrongWinds => "Strong Winds",
        }
    }

    /// Severity assigned when the event is lowered into a warning row.
    pub fn severity(&self) -> Severity {
        match self {
            EventKind::ExtremeHeat | EventKind::ExtremeCold => Severity::Severe,
            EventKind::HeavyPrecipitation | EventKind::StrongWinds => Severity::Moderate,
        }
    }
}

/// A transient severe-weather event produced by the classifier.
///
/// Never persisted directly; one event per crossed rule with the full list of
/// crossing timestamps attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SevereWeatherEvent {
    pub kind: EventKind,
    pub threshold: String,
    pub times: Vec<DateTime<Utc>>,
    pub description: String,
}

impl SevereWeatherEvent {
    /// Convert into a warning row spanning the first to last crossing.
    pub fn to_warning(&self) -> WeatherWarning {
        WeatherWarning {
            warning_type: self.kind.label().to_string(),
            description: self.description.clone(),
            start_time: self.times.first().copied(),
            end_time: self.times.last().copied(),
            severity: self.kind.severity(),
        }
    }
}
