//! Public holiday table and working-day arithmetic for the deployment year.

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayKind {
    National,
    Religious,
}

#[derive(Debug, Clone)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
    pub kind: HolidayKind,
}

const TABLE: &[(i32, u32, u32, &str, HolidayKind)] = &[
    (2024, 1, 1, "New Year's Day", HolidayKind::National),
    (2024, 4, 1, "Good Friday", HolidayKind::Religious),
    (2024, 4, 3, "Easter Monday", HolidayKind::Religious),
    (2024, 5, 1, "Labour Day", HolidayKind::National),
    (2024, 6, 17, "Eid al-Adha (estimated)", HolidayKind::Religious),
    (2024, 10, 20, "Mashujaa Day", HolidayKind::National),
    (2024, 12, 12, "Jamhuri Day", HolidayKind::National),
    (2024, 12, 25, "Christmas Day", HolidayKind::Religious),
    (2024, 12, 26, "Boxing Day", HolidayKind::National),
];

static HOLIDAYS: Lazy<Vec<Holiday>> = Lazy::new(|| {
    TABLE
        .iter()
        .map(|&(year, month, day, name, kind)| Holiday {
            date: NaiveDate::from_ymd_opt(year, month, day).expect("hard-coded table date"),
            name,
            kind,
        })
        .collect()
});

pub fn public_holidays() -> &'static [Holiday] {
    &HOLIDAYS
}

pub fn holiday_on(date: NaiveDate) -> Option<&'static Holiday> {
    HOLIDAYS.iter().find(|holiday| holiday.date == date)
}

pub fn is_public_holiday(date: NaiveDate) -> bool {
    holiday_on(date).is_some()
}

/// Weekday that is not a public holiday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_public_holiday(date)
}

/// Business days in `[start, end]`, inclusive on both ends.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if is_business_day(current) {
            days.push(current);
        }
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = next;
    }
    days
}
