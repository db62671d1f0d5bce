use time::{Date, Month, OffsetDateTime};

/// January 1 of `year`, or `None` outside the supported calendar range.
pub fn beginning_of_year(year: i32) -> Option<Date> {
    Date::from_calendar_date(year, Month::January, 1).ok()
}

/// Start dates tried for a ticker, newest first: the current year, then the
/// previous one for issuers whose current filings are not yet published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodAnchors {
    pub current: Date,
    pub previous: Date,
}

impl PeriodAnchors {
    pub fn for_date(today: Date) -> Self {
        let current = beginning_of_year(today.year()).unwrap_or(today);
        let previous = beginning_of_year(today.year() - 1).unwrap_or(current);
        Self { current, previous }
    }

    pub fn for_today() -> Self {
        Self::for_date(OffsetDateTime::now_utc().date())
    }
}
