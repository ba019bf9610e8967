//! Request-level operations.
//!
//! Each function loads or merges one user document through a
//! [`ProfileStore`], runs the pure engine, and returns the response shape
//! the caller serializes. Validation happens before any write.

use crate::config::EngineConfig;
use crate::dates::to_iso_date;
use crate::store::{ProfileStore, UserDocument};
use crate::{
    classify_phase, pregnancy_progress, project_cycles, resolve_pregnancy, CycleProfile,
    CycleProjectionResponse, Error, PregnancyInput, PregnancySavePayload,
    PregnancyStatusResponse, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

/// Create a user document and return its new identifier
pub fn register_user(
    store: &dyn ProfileStore,
    name: &str,
    email: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(Error::validation("All fields are required"));
    }

    let user_id = Uuid::new_v4().to_string();
    store.merge(
        &user_id,
        json!({
            "name": name,
            "email": email,
            "createdAt": now.to_rfc3339(),
        }),
    )?;

    tracing::info!("Registered user {}", user_id);
    Ok(user_id)
}

/// Save baseline cycle parameters
pub fn save_cycle_profile(
    store: &dyn ProfileStore,
    user_id: &str,
    profile: &CycleProfile,
) -> Result<()> {
    profile.validate()?;

    store.merge(
        user_id,
        json!({
            "lastPeriodDate": to_iso_date(profile.last_period_date),
            "cycleLength": profile.cycle_length,
            "periodDuration": profile.period_duration,
        }),
    )?;

    tracing::info!("Saved cycle profile for user {}", user_id);
    Ok(())
}

/// Load a user's normalized cycle profile
pub fn load_cycle_profile(
    store: &dyn ProfileStore,
    user_id: &str,
    cfg: &EngineConfig,
) -> Result<CycleProfile> {
    load_document(store, user_id)?
        .cycle_profile(cfg)?
        .ok_or_else(|| Error::NotFound(format!("No cycle data for user {}", user_id)))
}

/// Projected calendar and current phase for a stored profile
pub fn cycle_projection(
    store: &dyn ProfileStore,
    user_id: &str,
    today: NaiveDate,
    cfg: &EngineConfig,
) -> Result<CycleProjectionResponse> {
    let profile = load_cycle_profile(store, user_id, cfg)?;
    build_cycle_response(&profile, today, cfg)
}

/// Flatten the projected cycles into the client response
pub fn build_cycle_response(
    profile: &CycleProfile,
    today: NaiveDate,
    cfg: &EngineConfig,
) -> Result<CycleProjectionResponse> {
    let cycles = project_cycles(profile, cfg)?;
    let status = classify_phase(profile, &cycles, today, cfg);

    Ok(CycleProjectionResponse {
        period_days: cycles
            .iter()
            .flat_map(|c| c.period_days.iter().copied().map(to_iso_date))
            .collect(),
        fertile_window: cycles
            .iter()
            .flat_map(|c| c.fertile_window.iter().copied().map(to_iso_date))
            .collect(),
        ovulation_days: cycles.iter().map(|c| to_iso_date(c.ovulation_day)).collect(),
        current_phase: status.current_phase.to_string(),
        current_day_in_cycle: status.current_day_in_cycle,
        cycle_length: profile.cycle_length,
    })
}

/// Resolve and persist pregnancy data from a single anchor
pub fn save_pregnancy(
    store: &dyn ProfileStore,
    user_id: &str,
    input: &PregnancyInput,
    now: NaiveDate,
    cfg: &EngineConfig,
) -> Result<PregnancySavePayload> {
    let profile = resolve_pregnancy(input, now, cfg)?;
    let payload = PregnancySavePayload::from(&profile);

    store.merge(user_id, serde_json::to_value(&payload)?)?;

    tracing::info!(
        "Saved pregnancy for user {} (due {})",
        user_id,
        profile.due_date
    );
    Ok(payload)
}

/// Mark the user as no longer pregnant; stored dates are kept
pub fn clear_pregnancy(store: &dyn ProfileStore, user_id: &str) -> Result<()> {
    load_document(store, user_id)?;
    store.merge(user_id, json!({ "isPregnant": false }))?;
    tracing::info!("Cleared pregnancy for user {}", user_id);
    Ok(())
}

/// Live pregnancy progress for a stored profile
pub fn pregnancy_status(
    store: &dyn ProfileStore,
    user_id: &str,
    today: NaiveDate,
    cfg: &EngineConfig,
) -> Result<PregnancyStatusResponse> {
    let stored = load_document(store, user_id)?.pregnancy()?;

    let lmp = match stored.lmp {
        Some(lmp) if stored.is_pregnant => lmp,
        _ => {
            return Err(Error::NotFound(format!(
                "No pregnancy data for user {}",
                user_id
            )))
        }
    };

    let status = pregnancy_progress(lmp, today, cfg);

    Ok(PregnancyStatusResponse {
        weeks_pregnant: status.weeks_pregnant,
        days_remaining: status.days_remaining,
        due_date: stored.due_date.map(to_iso_date),
        lmp: Some(to_iso_date(lmp)),
        percentage_progress: status.percentage_progress,
        trimester: status.trimester.as_str().to_string(),
    })
}

fn load_document(store: &dyn ProfileStore, user_id: &str) -> Result<UserDocument> {
    store
        .get(user_id)?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
}
