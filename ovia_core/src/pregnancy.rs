//! Pregnancy anchor resolution and progress.
//!
//! Saving resolves whichever anchor the user gave into an
//! `(lmp, due_date, weeks_pregnant)` triple with
//! `due_date = lmp + pregnancy_term_days`. Reading recomputes progress
//! from the stored LMP only.

use crate::config::EngineConfig;
use crate::dates::{add_days, check_supported, days_between};
use crate::{PregnancyAnchor, PregnancyInput, PregnancyProfile, PregnancyStatus, Result, Trimester};
use chrono::NaiveDate;

/// First week of the second trimester
pub const SECOND_TRIMESTER_WEEK: i64 = 13;
/// First week of the third trimester
pub const THIRD_TRIMESTER_WEEK: i64 = 27;

/// Resolve the submitted anchor into a full pregnancy profile as of `now`
pub fn resolve_pregnancy(
    input: &PregnancyInput,
    now: NaiveDate,
    cfg: &EngineConfig,
) -> Result<PregnancyProfile> {
    let anchor = input.anchor()?;
    let profile = resolve_anchor(anchor, now, cfg)?;

    tracing::debug!(
        "Resolved {:?} to lmp={} due={} weeks={}",
        anchor,
        profile.lmp,
        profile.due_date,
        profile.weeks_pregnant
    );

    Ok(profile)
}

/// Derive the other two values from a single anchor
///
/// Out-of-range anchors or dates are a validation error.
pub fn resolve_anchor(
    anchor: PregnancyAnchor,
    now: NaiveDate,
    cfg: &EngineConfig,
) -> Result<PregnancyProfile> {
    anchor.validate()?;
    check_supported(now)?;
    cfg.validate()?;

    let term = i64::from(cfg.pregnancy_term_days);

    let (lmp, weeks_pregnant) = match anchor {
        PregnancyAnchor::WeeksPregnant(weeks) => {
            (add_days(now, -i64::from(weeks) * 7), i64::from(weeks))
        }
        PregnancyAnchor::DueDate(due) => {
            let lmp = add_days(due, -term);
            (lmp, completed_weeks(lmp, now))
        }
        PregnancyAnchor::Lmp(lmp) => (lmp, completed_weeks(lmp, now)),
    };

    Ok(PregnancyProfile {
        is_pregnant: true,
        lmp,
        due_date: add_days(lmp, term),
        weeks_pregnant,
    })
}

/// Live progress from the LMP
pub fn pregnancy_progress(lmp: NaiveDate, now: NaiveDate, cfg: &EngineConfig) -> PregnancyStatus {
    let term = i64::from(cfg.pregnancy_term_days);
    let days_pregnant = days_between(lmp, now);
    let weeks_pregnant = days_pregnant.div_euclid(7);

    PregnancyStatus {
        weeks_pregnant,
        days_remaining: (term - days_pregnant).max(0),
        percentage_progress: percentage(days_pregnant, term),
        trimester: trimester_for_week(weeks_pregnant),
    }
}

pub fn trimester_for_week(weeks_pregnant: i64) -> Trimester {
    if weeks_pregnant < SECOND_TRIMESTER_WEEK {
        Trimester::First
    } else if weeks_pregnant < THIRD_TRIMESTER_WEEK {
        Trimester::Second
    } else {
        Trimester::Third
    }
}

fn completed_weeks(lmp: NaiveDate, now: NaiveDate) -> i64 {
    days_between(lmp, now).div_euclid(7)
}

/// `days / term` as a percentage, halves rounded up, clamped to 0..=100
fn percentage(days: i64, term: i64) -> u8 {
    let term = term.max(1);
    let rounded = (200 * days + term).div_euclid(2 * term);
    rounded.clamp(0, 100) as u8
}
