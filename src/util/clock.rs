//! Wall-clock and calendar helpers.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Current instant in UTC.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// The calendar day after `date`, or `None` at the end of the supported range.
#[must_use]
pub fn day_after(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

/// The calendar day before `date`, or `None` at the start of the supported range.
#[must_use]
pub fn day_before(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}
