use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime, UtcOffset, Weekday,
};

use crate::store::TimeRange;

/// Calendar-day math in the service's local offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn today(&self) -> Date {
        self.local_date(OffsetDateTime::now_utc())
    }

    pub fn local_date(&self, at: OffsetDateTime) -> Date {
        at.to_offset(self.offset).date()
    }

    pub fn start_of(&self, day: Date) -> OffsetDateTime {
        day.midnight().assume_offset(self.offset)
    }

    /// `[midnight, next midnight)` of `day`.
    pub fn day_range(&self, day: Date) -> Option<TimeRange> {
        self.days_range(day, 1)
    }

    /// `days` whole days starting at `first`, or `None` near the ends of the calendar.
    pub fn days_range(&self, first: Date, days: i64) -> Option<TimeRange> {
        let end = first.checked_add(Duration::days(days))?;
        if !clear_of_calendar_ends(first) || !clear_of_calendar_ends(end) {
            return None;
        }
        Some(TimeRange {
            start: self.start_of(first),
            end: self.start_of(end),
        })
    }

    /// Every range the dashboard reads for `selected`.
    pub fn report_window(&self, selected: Date, lookback_days: u32) -> Option<ReportWindow> {
        let monday = week_start(selected)?;
        let streak_from = selected.checked_sub(Duration::days(i64::from(lookback_days) - 1))?;
        Some(ReportWindow {
            selected,
            day: self.day_range(selected)?,
            week: self.days_range(monday, 7)?,
            streak: self.days_range(streak_from, i64::from(lookback_days))?,
        })
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (taken as its local day).
    pub fn parse_date(&self, raw: &str) -> Option<Date> {
        let raw = raw.trim();
        if let Ok(day) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
            return Some(day);
        }
        OffsetDateTime::parse(raw, &Rfc3339)
            .ok()
            .filter(|at| clear_of_calendar_ends(at.date()))
            .map(|at| self.local_date(at))
    }
}

/// Offsets move a day by at most 26 hours, so two spare days keep every
/// conversion inside `Date::MIN..=Date::MAX`.
fn clear_of_calendar_ends(day: Date) -> bool {
    day.checked_sub(Duration::days(2)).is_some() && day.checked_add(Duration::days(2)).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub selected: Date,
    pub day: TimeRange,
    pub week: TimeRange,
    pub streak: TimeRange,
}

/// Monday of the week containing `day`.
pub fn week_start(day: Date) -> Option<Date> {
    day.checked_sub(Duration::days(i64::from(day.weekday().number_days_from_monday())))
}

pub fn weekday_label(day: Date) -> &'static str {
    match day.weekday() {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}
