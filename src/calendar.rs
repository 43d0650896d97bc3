use log::warn;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, Weekday};
use time_tz::{timezones, OffsetDateTimeExt, OffsetResult, PrimitiveDateTimeExt, Tz};

use crate::Result;

const FRIDAY: i64 = 4;

/// Time zone the US option markets settle in.
pub fn exchange_time_zone() -> &'static Tz {
    timezones::db::america::NEW_YORK
}

/// Current date at the exchange.
pub fn today_in_exchange() -> Date {
    OffsetDateTime::now_utc().to_timezone(exchange_time_zone()).date()
}

/// First day of the year `today` falls in.
pub fn ytd_start(today: Date) -> Date {
    today - Duration::days(i64::from(today.ordinal()) - 1)
}

/// Whole days between `start` and `today`. The gateway rejects a zero day duration so the
/// result is at least one.
pub fn ytd_duration_days(start: Date, today: Date) -> i32 {
    let days = (today - start).whole_days().max(1);
    i32::try_from(days).unwrap_or(i32::MAX)
}

/// Weekdays in `[start, end]`. Exchange holidays are not excluded.
pub fn trading_days(start: Date, end: Date) -> Vec<Date> {
    let mut days = Vec::new();
    let mut current = Some(start);

    while let Some(day) = current {
        if day > end {
            break;
        }
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            days.push(day);
        }
        current = day.next_day();
    }

    days
}

/// Friday expiry `weeks_out` weekly expiries after `date`.
///
/// The first candidate is the next Friday strictly after `date`, so a Friday rolls to the
/// following week. Each additional week adds seven days. A `weeks_out` of zero is treated as one.
pub fn nearest_expiry(date: Date, weeks_out: u32) -> Date {
    let mut days_ahead = FRIDAY - i64::from(date.weekday().number_days_from_monday());
    if days_ahead <= 0 {
        days_ahead += 7;
    }

    days_ahead += i64::from(weeks_out.saturating_sub(1)) * 7;

    date + Duration::days(days_ahead)
}

/// Formats an expiry the way contract requests expect it, e.g. `20250321`.
pub fn format_expiry(date: Date) -> Result<String> {
    Ok(date.format(format_description!("[year][month][day]"))?)
}

/// Formats a trading date for output, e.g. `2025-03-03`.
pub fn format_date(date: Date) -> Result<String> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

/// End of the exchange session for `date`, midnight of the following day at the exchange.
pub fn session_end(date: Date) -> OffsetDateTime {
    let next = date.next_day().unwrap_or(date);
    let midnight = PrimitiveDateTime::new(next, Time::MIDNIGHT);

    match midnight.assume_timezone(exchange_time_zone()) {
        OffsetResult::Some(end) => end,
        OffsetResult::Ambiguous(end, _) => end,
        OffsetResult::None => {
            warn!("midnight of {next} does not exist at the exchange. assuming UTC.");
            midnight.assume_utc()
        }
    }
}
