//! CSV export of a projected calendar.

use crate::dates::to_iso_date;
use crate::{ProjectedCycle, Result};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CalendarRow {
    cycle: usize,
    date: String,
    kind: &'static str,
}

/// Write every period, fertile and ovulation day as `cycle,date,kind` rows.
///
/// Ovulation days also appear as `fertile`, since the window contains them.
/// Returns the number of rows written.
pub fn write_calendar_csv<W: Write>(cycles: &[ProjectedCycle], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut rows = 0;

    for cycle in cycles {
        let period = cycle.period_days.iter().map(|d| (*d, "period"));
        let fertile = cycle.fertile_window.iter().map(|d| (*d, "fertile"));
        let ovulation = std::iter::once((cycle.ovulation_day, "ovulation"));

        for (date, kind) in period.chain(fertile).chain(ovulation) {
            writer.serialize(CalendarRow {
                cycle: cycle.index,
                date: to_iso_date(date),
                kind,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} calendar rows", rows);
    Ok(rows)
}
