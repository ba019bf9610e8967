//! Classify a calendar day into a named cycle phase.

use crate::config::EngineConfig;
use crate::dates::days_between;
use crate::projector::{cycle_end, ovulation_offset};
use crate::{CyclePhase, CycleProfile, CycleStatus, ProjectedCycle};
use chrono::NaiveDate;

/// Find the projected cycle containing `today` and name its phase.
///
/// `cycles` must come from [`crate::project_cycles`] for the same profile.
/// Days before the first cycle or after the last one are `Unknown`.
pub fn classify_phase(
    profile: &CycleProfile,
    cycles: &[ProjectedCycle],
    today: NaiveDate,
    cfg: &EngineConfig,
) -> CycleStatus {
    let containing = cycles
        .iter()
        .find(|cycle| {
            cycle.start_date <= today
                && cycle_end(cycle, profile).map_or(true, |end| today <= end)
        });

    let Some(cycle) = containing else {
        tracing::debug!("{} is outside the projected cycles", today);
        return CycleStatus::unknown();
    };

    let day = days_between(cycle.start_date, today) + 1;

    CycleStatus {
        current_phase: phase_for_day(profile, day, cfg),
        current_day_in_cycle: u32::try_from(day).ok(),
    }
}

/// Phase for a 1-based day of the cycle. First matching rule wins:
/// menstrual, fertile window, ovulation, luteal, otherwise follicular.
///
/// The window rule compares against the ovulation offset itself, so it
/// always claims the ovulation day first and `Ovulation` is never returned.
pub fn phase_for_day(profile: &CycleProfile, day: i64, cfg: &EngineConfig) -> CyclePhase {
    let ovulation = ovulation_offset(profile, cfg);
    let radius = i64::from(cfg.fertile_window_radius);

    if day <= i64::from(profile.period_duration) {
        CyclePhase::Menstrual
    } else if ovulation - radius <= day && day <= ovulation + radius {
        CyclePhase::FertileWindow
    } else if day == ovulation {
        CyclePhase::Ovulation
    } else if day > ovulation + radius {
        CyclePhase::Luteal
    } else {
        CyclePhase::Follicular
    }
}
