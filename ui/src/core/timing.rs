//! Time range defaults and the date formats shown on charts and tables.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// `2026-10-19 03PM`, the format of `start`/`end` on the wire and in the URL.
const RANGE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour repr:12][period]");

const TOOLTIP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[weekday], [month repr:short] [day padding:space], [hour repr:12 padding:none][period case:lower], [year]"
);


const MONTH_FORMAT: &[FormatItem<'static>] = format_description!("[month repr:long]");

pub fn now() -> OffsetDateTime {
    #[cfg(target_arch = "wasm32")]
    {
        let millis = js_sys::Date::now() as i64;
        from_millis(millis).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        OffsetDateTime::now_utc()
    }
}

pub fn now_millis() -> i64 {
    (now().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

pub fn format_range(at: OffsetDateTime) -> String {
    at.format(RANGE_FORMAT).unwrap_or_default()
}

pub fn format_range_millis(millis: i64) -> String {
    from_millis(millis).map(format_range).unwrap_or_default()
}

/// Header line of the shared chart tooltip, e.g. `Monday, Oct 19, 3pm, 2026`.
pub fn format_tooltip_millis(millis: i64) -> String {
    from_millis(millis)
        .and_then(|at| at.format(TOOLTIP_FORMAT).ok())
        .unwrap_or_default()
}

pub fn format_month_millis(millis: i64) -> String {
    from_millis(millis)
        .and_then(|at| at.format(MONTH_FORMAT).ok())
        .unwrap_or_default()
}

/// Same instant `months` calendar months earlier; the day is clamped to the
/// target month's length.
pub fn months_before(at: OffsetDateTime, months: u8) -> OffsetDateTime {
    let mut year = at.year();
    let mut month = at.month() as i32 - i32::from(months);
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let month = Month::try_from(month as u8).unwrap_or(Month::January);
    let day = at.day().min(time::util::days_in_year_month(year, month));
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => at.replace_date(date),
        Err(_) => at,
    }
}

/// Default dashboard range: now back to the first of last month, midnight UTC.
pub fn default_range(now: OffsetDateTime) -> (String, String) {
    let previous = months_before(now, 1);
    let start = Date::from_calendar_date(previous.year(), previous.month(), 1)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
        .unwrap_or(previous);
    (format_range(start), format_range(now))
}

/// Summary range: the same hour six months back up to now.
pub fn summary_range(now: OffsetDateTime) -> (String, String) {
    (format_range(months_before(now, 6)), format_range(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn default_range_starts_on_first_of_previous_month() {
        let now = datetime!(2024-03-15 15:42 UTC);
        let (start, end) = default_range(now);
        assert_eq!(start, "2024-02-01 12AM");
        assert_eq!(end, "2024-03-15 03PM");
    }

    #[test]
    fn default_range_wraps_the_year() {
        let (start, _) = default_range(datetime!(2024-01-10 09:00 UTC));
        assert_eq!(start, "2023-12-01 12AM");
    }

    #[test]
    fn summary_range_clamps_short_months() {
        let (start, _) = summary_range(datetime!(2024-08-31 10:00 UTC));
        assert_eq!(start, "2024-02-29 10AM");
    }

    #[test]
    fn tooltip_header_reads_naturally() {
        let millis = datetime!(2024-03-04 15:00 UTC).unix_timestamp() * 1000;
        assert_eq!(format_tooltip_millis(millis), "Monday, Mar  4, 3pm, 2024");
        assert_eq!(format_month_millis(millis), "March");
    }
}
