use tracing::warn;

use crate::models::{DailyPeriod, PeriodFields, TimeWindow};

/// Whether two half-open windows share any instant. Touching windows
/// (one ends exactly when the other starts) do not overlap.
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.start < b.end && b.start < a.end
}

/// Finds the first existing period in the candidate's branch and semester
/// whose window overlaps the candidate's, ignoring `exclude_id`.
///
/// Rows whose stored times cannot be parsed are skipped with a warning.
pub fn find_conflict<'a>(
    candidate: &PeriodFields,
    window: &TimeWindow,
    existing: &'a [DailyPeriod],
    exclude_id: Option<&str>,
) -> Option<&'a DailyPeriod> {
    existing
        .iter()
        .filter(|period| Some(period.id.as_str()) != exclude_id)
        .filter(|period| period.fields.same_group(candidate))
        .find(|period| match period.fields.window() {
            Ok(other) => overlaps(window, &other),
            Err(e) => {
                warn!("skipping period {} in conflict check: {}", period.id, e);
                false
            }
        })
}
