//! pt-BR clock formatting.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use std::time::Duration;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// `14:05:09`.
pub fn format_time(time: NaiveTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// `quinta-feira, 16 de outubro de 2026`.
pub fn format_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!(
        "{}, {} de {} de {}",
        weekday_name(date.weekday()),
        date.day(),
        month,
        date.year()
    )
}

/// Stopwatch display, `HH:MM:SS`. Hours do not wrap.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Current local time, formatted.
pub fn now_time() -> String {
    format_time(chrono::Local::now().time())
}

/// Current local date, formatted.
pub fn today() -> String {
    format_date(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn time_is_zero_padded() {
        let t = NaiveTime::from_hms_opt(7, 5, 3).expect("valid time");
        assert_eq!(format_time(t), "07:05:03");
    }

    #[test]
    fn long_portuguese_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
        assert_eq!(format_date(d), "sexta-feira, 16 de outubro de 2026");
        let d = NaiveDate::from_ymd_opt(2024, 3, 3).expect("valid date");
        assert_eq!(format_date(d), "domingo, 3 de março de 2024");
    }

    #[test]
    fn elapsed_rolls_minutes_into_hours() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(format_elapsed(Duration::from_secs(100 * 3600)), "100:00:00");
    }
}
