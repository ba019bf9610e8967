//! Core domain types for cycle and pregnancy tracking.
//!
//! Engine inputs (profiles), engine outputs (projected cycles, statuses)
//! and the response shapes handed to the serialization layer.

use crate::dates::check_supported;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest cycle (and period) accepted, in days
pub const MAX_CYCLE_LENGTH: u32 = 365;
/// Largest weeks-pregnant value accepted as an anchor
pub const MAX_WEEKS_PREGNANT: u32 = 52;

// ============================================================================
// Cycle Types
// ============================================================================

/// Baseline menstrual cycle parameters for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleProfile {
    pub last_period_date: NaiveDate,
    pub cycle_length: u32,
    pub period_duration: u32,
}

impl CycleProfile {
    /// Build a profile, rejecting out-of-range lengths and dates
    pub fn new(last_period_date: NaiveDate, cycle_length: u32, period_duration: u32) -> Result<Self> {
        let profile = Self {
            last_period_date,
            cycle_length,
            period_duration,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_length == 0 || self.cycle_length > MAX_CYCLE_LENGTH {
            return Err(Error::validation(format!(
                "cycleLength must be between 1 and {} days, got {}",
                MAX_CYCLE_LENGTH, self.cycle_length
            )));
        }
        if self.period_duration > MAX_CYCLE_LENGTH {
            return Err(Error::validation(format!(
                "periodDuration must be at most {} days, got {}",
                MAX_CYCLE_LENGTH, self.period_duration
            )));
        }
        check_supported(self.last_period_date)?;
        if self.period_duration > self.cycle_length {
            // Accepted as-is: the period simply runs into the next cycle's window
            tracing::warn!(
                "periodDuration {} exceeds cycleLength {}",
                self.period_duration,
                self.cycle_length
            );
        }
        Ok(())
    }
}

/// One projected cycle: period days, ovulation and the fertile window around it
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedCycle {
    pub index: usize,
    pub start_date: NaiveDate,
    pub period_days: Vec<NaiveDate>,
    pub ovulation_day: NaiveDate,
    pub fertile_window: Vec<NaiveDate>,
}

/// Named phase of the menstrual cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    FertileWindow,
    Ovulation,
    Luteal,
    Unknown,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::FertileWindow => "FertileWindow",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
            CyclePhase::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where "today" falls within the projected cycles
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    pub current_phase: CyclePhase,
    /// 1-based; `None` when today lies outside every projected cycle
    pub current_day_in_cycle: Option<u32>,
}

impl CycleStatus {
    pub fn unknown() -> Self {
        Self {
            current_phase: CyclePhase::Unknown,
            current_day_in_cycle: None,
        }
    }
}

// ============================================================================
// Pregnancy Types
// ============================================================================

/// Pregnancy anchor fields as submitted; at least one must be present
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyInput {
    pub weeks_pregnant: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub lmp: Option<NaiveDate>,
}

/// The single authoritative input a pregnancy calculation is seeded from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PregnancyAnchor {
    WeeksPregnant(u32),
    DueDate(NaiveDate),
    Lmp(NaiveDate),
}

impl PregnancyInput {
    /// Pick the anchor: weeks pregnant, then due date, then LMP
    pub fn anchor(&self) -> Result<PregnancyAnchor> {
        let anchor = if let Some(weeks) = self.weeks_pregnant {
            PregnancyAnchor::WeeksPregnant(weeks)
        } else if let Some(due) = self.due_date {
            PregnancyAnchor::DueDate(due)
        } else if let Some(lmp) = self.lmp {
            PregnancyAnchor::Lmp(lmp)
        } else {
            return Err(Error::validation(
                "One of weeksPregnant, dueDate or lmp is required",
            ));
        };
        anchor.validate()?;
        Ok(anchor)
    }
}

impl PregnancyAnchor {
    pub fn validate(&self) -> Result<()> {
        match *self {
            PregnancyAnchor::WeeksPregnant(weeks) if weeks > MAX_WEEKS_PREGNANT => {
                Err(Error::validation(format!(
                    "weeksPregnant must be at most {}, got {}",
                    MAX_WEEKS_PREGNANT, weeks
                )))
            }
            PregnancyAnchor::WeeksPregnant(_) => Ok(()),
            PregnancyAnchor::DueDate(date) | PregnancyAnchor::Lmp(date) => {
                check_supported(date).map(|_| ())
            }
        }
    }
}

/// Consistent pregnancy triple produced at save time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyProfile {
    pub is_pregnant: bool,
    pub lmp: NaiveDate,
    pub due_date: NaiveDate,
    /// Value at save time; never used on the read path
    pub weeks_pregnant: i64,
}

/// Pregnancy stage, split at weeks 13 and 27
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trimester::First => "First",
            Trimester::Second => "Second",
            Trimester::Third => "Third",
        }
    }
}

/// Live pregnancy progress, recomputed from the LMP
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyStatus {
    pub weeks_pregnant: i64,
    pub days_remaining: i64,
    pub percentage_progress: u8,
    pub trimester: Trimester,
}

// ============================================================================
// Response Types
// ============================================================================

/// Cycle calendar returned to clients; dates are `YYYY-MM-DD`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleProjectionResponse {
    pub period_days: Vec<String>,
    pub fertile_window: Vec<String>,
    pub ovulation_days: Vec<String>,
    pub current_phase: String,
    pub current_day_in_cycle: Option<u32>,
    pub cycle_length: u32,
}

/// Pregnancy progress returned to clients
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyStatusResponse {
    pub weeks_pregnant: i64,
    pub days_remaining: i64,
    pub due_date: Option<String>,
    pub lmp: Option<String>,
    pub percentage_progress: u8,
    pub trimester: String,
}

/// Document fields written when pregnancy data is saved
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PregnancySavePayload {
    pub is_pregnant: bool,
    pub weeks_pregnant: i64,
    /// RFC 3339, midnight UTC
    pub due_date: String,
    /// RFC 3339, midnight UTC
    pub lmp: String,
}

impl From<&PregnancyProfile> for PregnancySavePayload {
    fn from(profile: &PregnancyProfile) -> Self {
        Self {
            is_pregnant: profile.is_pregnant,
            weeks_pregnant: profile.weeks_pregnant,
            due_date: crate::dates::to_iso_datetime(profile.due_date),
            lmp: crate::dates::to_iso_datetime(profile.lmp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        crate::dates::parse_calendar_date(s).unwrap()
    }

    #[test]
    fn test_zero_cycle_length_rejected() {
        let err = CycleProfile::new(date("2024-01-01"), 0, 5).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_long_period_is_accepted() {
        assert!(CycleProfile::new(date("2024-01-01"), 5, 7).is_ok());
    }

    #[test]
    fn test_cycle_length_limits() {
        assert!(CycleProfile::new(date("2024-01-01"), MAX_CYCLE_LENGTH, MAX_CYCLE_LENGTH).is_ok());

        for (cycle_length, period_duration) in [
            (MAX_CYCLE_LENGTH + 1, 5),
            (u32::MAX, 5),
            (28, MAX_CYCLE_LENGTH + 1),
            (28, u32::MAX),
        ] {
            let err = CycleProfile::new(date("2024-01-01"), cycle_length, period_duration)
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }

    #[test]
    fn test_profile_date_must_be_supported() {
        let profile = CycleProfile {
            last_period_date: NaiveDate::MAX,
            cycle_length: 28,
            period_duration: 5,
        };
        assert!(matches!(profile.validate().unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn test_anchor_precedence() {
        let input = PregnancyInput {
            weeks_pregnant: Some(10),
            due_date: Some(date("2024-12-28")),
            lmp: Some(date("2024-03-01")),
        };
        assert_eq!(input.anchor().unwrap(), PregnancyAnchor::WeeksPregnant(10));

        let input = PregnancyInput {
            weeks_pregnant: None,
            due_date: Some(date("2024-12-28")),
            lmp: Some(date("2024-03-01")),
        };
        assert_eq!(
            input.anchor().unwrap(),
            PregnancyAnchor::DueDate(date("2024-12-28"))
        );

        let input = PregnancyInput {
            lmp: Some(date("2024-03-01")),
            ..Default::default()
        };
        assert_eq!(input.anchor().unwrap(), PregnancyAnchor::Lmp(date("2024-03-01")));
    }

    #[test]
    fn test_anchor_limits() {
        let at_limit = PregnancyInput {
            weeks_pregnant: Some(MAX_WEEKS_PREGNANT),
            ..Default::default()
        };
        assert!(at_limit.anchor().is_ok());

        for weeks in [MAX_WEEKS_PREGNANT + 1, u32::MAX] {
            let input = PregnancyInput {
                weeks_pregnant: Some(weeks),
                ..Default::default()
            };
            assert!(matches!(input.anchor().unwrap_err(), Error::Validation(_)));
        }

        let input = PregnancyInput {
            due_date: Some(NaiveDate::MAX),
            ..Default::default()
        };
        assert!(matches!(input.anchor().unwrap_err(), Error::Validation(_)));

        let input = PregnancyInput {
            lmp: Some(NaiveDate::MIN),
            ..Default::default()
        };
        assert!(matches!(input.anchor().unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn test_anchor_required() {
        let err = PregnancyInput::default().anchor().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_phase_serializes_by_name() {
        let status = CycleStatus {
            current_phase: CyclePhase::FertileWindow,
            current_day_in_cycle: Some(12),
        };
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["currentPhase"], "FertileWindow");
        assert_eq!(json["currentDayInCycle"], 12);

        let json = serde_json::to_value(CycleStatus::unknown()).unwrap();
        assert!(json["currentDayInCycle"].is_null());
    }

    #[test]
    fn test_save_payload_uses_datetimes() {
        let profile = PregnancyProfile {
            is_pregnant: true,
            lmp: date("2024-03-23"),
            due_date: date("2024-12-28"),
            weeks_pregnant: 10,
        };
        let payload = PregnancySavePayload::from(&profile);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["isPregnant"], true);
        assert_eq!(json["weeksPregnant"], 10);
        assert_eq!(json["lmp"], "2024-03-23T00:00:00.000Z");
        assert_eq!(json["dueDate"], "2024-12-28T00:00:00.000Z");
    }
}
