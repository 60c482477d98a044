//! Collision Record Module
//! Typed rows of the base table and the small categorical value sets.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Contributing-factor value the source uses when no cause was recorded.
pub const UNSPECIFIED_FACTOR: &str = "Unspecified";

/// Person class whose injuries and deaths are counted separately.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum AffectedCategory {
    #[default]
    #[serde(alias = "pedestrians")]
    #[strum(to_string = "pedestrian", serialize = "pedestrians")]
    Pedestrian,
    #[serde(alias = "cyclists")]
    #[strum(to_string = "cyclist", serialize = "cyclists")]
    Cyclist,
    #[serde(alias = "motorists")]
    #[strum(to_string = "motorist", serialize = "motorists")]
    Motorist,
}

impl AffectedCategory {
    /// Plural heading used by the street ranking table.
    pub const fn plural_label(self) -> &'static str {
        match self {
            Self::Pedestrian => "Pedestrians",
            Self::Cyclist => "Cyclists",
            Self::Motorist => "Motorists",
        }
    }
}

/// Outcome label of the long-format vehicle/factor table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum AffectedLabel {
    Injured,
    Killed,
}

/// One collision from the source file, after load-time cleaning.
///
/// Field names serialize in the canonical lowercase column form; the
/// combined crash date and time is exposed as `date/time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionRecord {
    #[serde(rename = "date/time")]
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub injured_persons: u32,
    pub killed_persons: u32,
    pub injured_pedestrians: u32,
    pub killed_pedestrians: u32,
    pub injured_cyclists: u32,
    pub killed_cyclists: u32,
    pub injured_motorists: u32,
    pub killed_motorists: u32,
    pub borough: Option<String>,
    pub on_street_name: Option<String>,
    pub contributing_factor_vehicle_1: Option<String>,
    pub vehicle_type_1: Option<String>,
}

impl CollisionRecord {
    /// Injured count for one person class.
    pub fn injured(&self, category: AffectedCategory) -> u32 {
        match category {
            AffectedCategory::Pedestrian => self.injured_pedestrians,
            AffectedCategory::Cyclist => self.injured_cyclists,
            AffectedCategory::Motorist => self.injured_motorists,
        }
    }

    /// Killed count for one person class.
    pub fn killed(&self, category: AffectedCategory) -> u32 {
        match category {
            AffectedCategory::Pedestrian => self.killed_pedestrians,
            AffectedCategory::Cyclist => self.killed_cyclists,
            AffectedCategory::Motorist => self.killed_motorists,
        }
    }

    /// Injured plus killed for one person class.
    pub fn affected(&self, category: AffectedCategory) -> u64 {
        u64::from(self.injured(category)) + u64::from(self.killed(category))
    }

    /// Injured plus killed across all persons.
    pub fn affected_persons(&self) -> u64 {
        u64::from(self.injured_persons) + u64::from(self.killed_persons)
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn minute(&self) -> u32 {
        self.timestamp.minute()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Hour of day with minutes as a fraction, e.g. 14:30 -> 14.5.
    pub fn fractional_hour(&self) -> f64 {
        f64::from(self.hour()) + f64::from(self.minute()) / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_category_names() {
        assert_eq!(
            AffectedCategory::from_str("pedestrian").unwrap(),
            AffectedCategory::Pedestrian
        );
        assert_eq!(
            AffectedCategory::from_str("Cyclists").unwrap(),
            AffectedCategory::Cyclist
        );
        assert_eq!(
            AffectedCategory::from_str("MOTORIST").unwrap(),
            AffectedCategory::Motorist
        );
        assert!(AffectedCategory::from_str("horse").is_err());
    }

    #[test]
    fn category_display_is_singular_lowercase() {
        assert_eq!(AffectedCategory::Cyclist.to_string(), "cyclist");
        assert_eq!(AffectedCategory::Cyclist.plural_label(), "Cyclists");
    }

    #[test]
    fn affected_sums_injured_and_killed() {
        let record = CollisionRecord {
            injured_cyclists: 2,
            killed_cyclists: 1,
            injured_persons: 4,
            killed_persons: 1,
            ..Default::default()
        };
        assert_eq!(record.affected(AffectedCategory::Cyclist), 3);
        assert_eq!(record.affected(AffectedCategory::Pedestrian), 0);
        assert_eq!(record.affected_persons(), 5);
    }

    #[test]
    fn affected_does_not_overflow_at_count_limit() {
        let record = CollisionRecord {
            injured_persons: u32::MAX,
            killed_persons: 1,
            injured_motorists: u32::MAX,
            killed_motorists: u32::MAX,
            ..Default::default()
        };
        assert_eq!(record.affected_persons(), u64::from(u32::MAX) + 1);
        assert_eq!(
            record.affected(AffectedCategory::Motorist),
            2 * u64::from(u32::MAX)
        );
    }

    #[test]
    fn deserializes_singular_and_plural_category_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            category: AffectedCategory,
        }

        for (input, expected) in [
            ("pedestrian", AffectedCategory::Pedestrian),
            ("pedestrians", AffectedCategory::Pedestrian),
            ("cyclists", AffectedCategory::Cyclist),
            ("motorists", AffectedCategory::Motorist),
        ] {
            let json = format!(r#"{{"category":"{input}"}}"#);
            let wrapper: Wrapper = serde_json::from_str(&json).unwrap();
            assert_eq!(wrapper.category, expected);
        }
    }

    #[test]
    fn fractional_hour_includes_minutes() {
        let record = CollisionRecord {
            timestamp: NaiveDate::from_ymd_opt(2021, 7, 9)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            ..Default::default()
        };
        assert_eq!(record.hour(), 14);
        assert_eq!(record.minute(), 30);
        assert!((record.fractional_hour() - 14.5).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_timestamp_under_canonical_name() {
        let record = CollisionRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("date/time").is_some());
        assert!(json.get("timestamp").is_none());
    }
}
