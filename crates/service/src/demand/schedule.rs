//! Deadline helpers: due-soon / overdue flags and period filter presets.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use models::demand::DemandStatus;

/// A demand counts as "due soon" when the deadline is within this window.
pub const DUE_SOON_HOURS: i64 = 48;

/// Deadline within the next 48h and not yet completed.
pub fn is_due_soon(due_at: Option<&DateTime<FixedOffset>>, status: &str, now: DateTime<Utc>) -> bool {
    let due = match due_at {
        Some(d) => *d,
        None => return false,
    };
    if status == DemandStatus::Concluido.as_str() {
        return false;
    }
    let diff = due.with_timezone(&Utc) - now;
    diff >= Duration::zero() && diff <= Duration::hours(DUE_SOON_HOURS)
}

/// Deadline in the past and not yet completed.
pub fn is_overdue(due_at: Option<&DateTime<FixedOffset>>, status: &str, now: DateTime<Utc>) -> bool {
    let due = match due_at {
        Some(d) => *d,
        None => return false,
    };
    if status == DemandStatus::Concluido.as_str() {
        return false;
    }
    due.with_timezone(&Utc) < now
}

/// Start of the filter window for a period preset applied to `created_at`.
/// Presets: "7" / "30" (start of day N days ago) and "month" (first of month).
/// Anything else means no period filter.
pub fn period_start(preset: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match preset {
        "7" => Some(start_of_day(now - Duration::days(7))),
        "30" => Some(start_of_day(now - Duration::days(30))),
        "month" => {
            let first = now.date_naive().with_day(1)?;
            Some(Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN)))
        }
        _ => None,
    }
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}

/// UTC day bounds [start, end) of the calendar day a deadline falls on.
pub fn day_bounds(due_at: &DateTime<FixedOffset>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(due_at.with_timezone(&Utc));
    (start, start + Duration::days(1))
}

pub fn count_due_soon<'a, I>(demands: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a models::demand::Model>,
{
    demands
        .into_iter()
        .filter(|d| is_due_soon(d.due_at.as_ref(), &d.status, now))
        .count()
}
