//! Cycle projection.
//!
//! Lays out `projection_cycles` consecutive cycles starting at the last
//! period date. Ovulation always sits `luteal_phase_days` before the next
//! cycle start, so a cycle shorter than the luteal phase places ovulation
//! (and part of the fertile window) before its own start date. That input
//! is accepted and projected as-is.

use crate::config::EngineConfig;
use crate::dates::{add_days, checked_add_days};
use crate::{CycleProfile, ProjectedCycle, Result};
use chrono::NaiveDate;

/// Project the configured number of cycles from a profile
///
/// Fails with a validation error when the profile is out of range.
pub fn project_cycles(profile: &CycleProfile, cfg: &EngineConfig) -> Result<Vec<ProjectedCycle>> {
    profile.validate()?;
    cfg.validate()?;

    let cycles: Vec<_> = (0..cfg.projection_cycles)
        .map(|index| project_cycle(profile, index, cfg))
        .collect();

    tracing::debug!(
        "Projected {} cycles of {} days from {}",
        cycles.len(),
        profile.cycle_length,
        profile.last_period_date
    );

    Ok(cycles)
}

/// Project a single cycle by its 0-based index
fn project_cycle(profile: &CycleProfile, index: usize, cfg: &EngineConfig) -> ProjectedCycle {
    let cycle_length = i64::from(profile.cycle_length);
    let start_date = add_days(profile.last_period_date, index as i64 * cycle_length);

    let period_days = (0..i64::from(profile.period_duration))
        .map(|offset| add_days(start_date, offset))
        .collect();

    let ovulation_day = add_days(start_date, ovulation_offset(profile, cfg));

    let radius = i64::from(cfg.fertile_window_radius);
    let fertile_window = (-radius..=radius)
        .map(|offset| add_days(ovulation_day, offset))
        .collect();

    ProjectedCycle {
        index,
        start_date,
        period_days,
        ovulation_day,
        fertile_window,
    }
}

/// Days from cycle start to ovulation; negative for very short cycles
pub fn ovulation_offset(profile: &CycleProfile, cfg: &EngineConfig) -> i64 {
    i64::from(profile.cycle_length) - i64::from(cfg.luteal_phase_days)
}

/// Last calendar day belonging to a cycle; `None` past chrono's range
pub(crate) fn cycle_end(cycle: &ProjectedCycle, profile: &CycleProfile) -> Option<NaiveDate> {
    checked_add_days(cycle.start_date, i64::from(profile.cycle_length) - 1)
}
