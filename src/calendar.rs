use chrono::{Datelike, NaiveDate};

/// last valid day of the given month
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&d| NaiveDate::from_ymd_opt(year, month, d).is_some())
        .unwrap_or(28)
}

/// calendar date for the desired day in the given month, clamped to month length
pub fn due_date_in_month(year: i32, month: u32, desired_day: u32) -> NaiveDate {
    let day = desired_day.clamp(1, last_day_of_month(year, month));
    // clamped day is always valid for the month
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// earliest date on or after `start` whose (clamped) day-of-month equals `due_day`
pub fn first_due_on_or_after(start: NaiveDate, due_day: u32) -> NaiveDate {
    let same_month = due_date_in_month(start.year(), start.month(), due_day);
    if same_month >= start {
        return same_month;
    }
    let (year, month) = next_month(start.year(), start.month());
    due_date_in_month(year, month, due_day)
}

/// exactly one calendar month after `prev`, targeting `desired_day` clamped to month length
pub fn add_month_clamped(prev: NaiveDate, desired_day: u32) -> NaiveDate {
    let (year, month) = next_month(prev.year(), prev.month());
    due_date_in_month(year, month, desired_day)
}

/// end of the semi-monthly cycle containing `date`: the 15th for days 1-15,
/// else the last day of the month
pub fn period_end_after(date: NaiveDate) -> NaiveDate {
    if date.day() <= 15 {
        due_date_in_month(date.year(), date.month(), 15)
    } else {
        due_date_in_month(date.year(), date.month(), 31)
    }
}

/// first day of the cycle following a period end
pub fn next_period_start(period_end: NaiveDate) -> NaiveDate {
    period_end.succ_opt().unwrap_or(period_end)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
