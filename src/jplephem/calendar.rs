//! Calendar date and Julian date conversion functions
//!
//! Dates are converted without any time-scale correction: the Julian date
//! produced from a civil date is used as-is for ephemeris lookups.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::constants::{DAY_S, GREGORIAN_START};

/// Julian date of 1970-01-01T00:00:00
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Calendar in which a date is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// Gregorian from 1582-10-15, Julian before when converting from a Julian date
    #[default]
    Gregorian,
    Julian,
}

/// Calendar date with a fractional hour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Hours since midnight
    pub hour: f64,
}

/// Julian date for a calendar date and hour
///
/// With [`Calendar::Gregorian`] the Gregorian rules are applied to every date,
/// including those before the reform.
pub fn julian_day(year: i32, month: u32, day: u32, hour: f64, calendar: Calendar) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };

    let b = match calendar {
        Calendar::Gregorian => {
            let a = (y / 100.0).floor();
            2.0 - a + (a / 4.0).floor()
        }
        Calendar::Julian => 0.0,
    };

    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day as f64 + b - 1524.5
        + hour / 24.0
}

/// Calendar date for a Julian date
pub fn calendar_date(jd: f64, calendar: Calendar) -> CalendarDate {
    let shifted = jd + 0.5;
    let z = shifted.floor();
    let f = shifted - z;
    let z = z as i64;

    let a = match calendar {
        Calendar::Gregorian if z >= GREGORIAN_START as i64 => {
            let alpha = ((z as f64 - 1_867_216.25) / 36_524.25).floor() as i64;
            z + 1 + alpha - alpha.div_euclid(4)
        }
        _ => z,
    };

    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
    let d = (365.25 * c as f64).floor() as i64;
    let e = ((b - d) as f64 / 30.6001).floor() as i64;

    let day = b - d - (30.6001 * e as f64).floor() as i64;
    let month = if e < 14 { e - 1 } else { e - 13 };
    let year = if month > 2 { c - 4716 } else { c - 4715 };

    CalendarDate {
        year: year as i32,
        month: month as u32,
        day: day as u32,
        hour: f * 24.0,
    }
}

/// Julian date of a UTC instant
pub fn julian_day_from_datetime(datetime: &DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JD
        + datetime.timestamp() as f64 / DAY_S
        + datetime.timestamp_subsec_nanos() as f64 / (DAY_S * 1e9)
}

/// UTC instant of a Julian date, if chrono can represent it
pub fn datetime_from_julian_day(jd: f64) -> Option<DateTime<Utc>> {
    let seconds = (jd - UNIX_EPOCH_JD) * DAY_S;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or RFC 3339
pub fn parse_date(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(julian_day_from_datetime(&dt.with_timezone(&Utc)));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(julian_day_from_datetime(&naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| julian_day_from_datetime(&naive.and_utc()))
}

/// Format a Julian date as `YYYY-MM-DD HH:MM:SS` (UTC, no time-scale correction)
pub fn format_date(jd: f64) -> String {
    match datetime_from_julian_day(jd) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => {
            let date = calendar_date(jd, Calendar::Gregorian);
            format!("{:04}-{:02}-{:02} {:05.2}h", date.year, date.month, date.day, date.hour)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::J2000;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1, 1, 12.0, J2000)]
    #[case(2020, 1, 1, 0.0, 2458849.5)]
    #[case(1969, 7, 20, 0.0, 2440422.5)]
    #[case(1900, 1, 1, 0.0, 2415020.5)]
    #[case(1582, 10, 15, 0.0, 2299160.5)]
    #[case(-4712, 1, 1, 12.0, 38.0)]
    fn test_julian_day_gregorian(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(julian_day(year, month, day, hour, Calendar::Gregorian), expected);
    }

    #[test]
    fn test_julian_calendar() {
        // The day before the reform, in the Julian calendar
        assert_eq!(julian_day(1582, 10, 4, 0.0, Calendar::Julian), 2299159.5);
        assert_eq!(julian_day(-4712, 1, 1, 12.0, Calendar::Julian), 0.0);

        let date = calendar_date(2299159.5, Calendar::Gregorian);
        assert_eq!((date.year, date.month, date.day), (1582, 10, 4));
    }

    #[test]
    fn test_calendar_date() {
        let date = calendar_date(J2000, Calendar::Gregorian);
        assert_eq!((date.year, date.month, date.day), (2000, 1, 1));
        assert_relative_eq!(date.hour, 12.0);

        let date = calendar_date(2440422.75, Calendar::Gregorian);
        assert_eq!((date.year, date.month, date.day), (1969, 7, 20));
        assert_relative_eq!(date.hour, 6.0);
    }

    #[test]
    fn test_round_trip() {
        for jd in [2299160.5, 2440400.5, 2451545.25, 2467000.5, 1000000.5] {
            let date = calendar_date(jd, Calendar::Gregorian);
            let calendar = if jd >= GREGORIAN_START as f64 - 0.5 {
                Calendar::Gregorian
            } else {
                Calendar::Julian
            };
            let back = julian_day(date.year, date.month, date.day, date.hour, calendar);
            assert_relative_eq!(back, jd, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_datetime_conversions() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(julian_day_from_datetime(&dt), J2000);
        assert_eq!(datetime_from_julian_day(J2000), Some(dt));
        assert_eq!(format_date(J2000), "2000-01-01 12:00:00");
    }

    #[rstest]
    #[case("2000-01-01", 2451544.5)]
    #[case("2000-01-01 12:00:00", J2000)]
    #[case("2000-01-01T18:00:00", 2451545.25)]
    #[case("2000-01-01T12:00:00Z", J2000)]
    fn test_parse_date(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_date(text).unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2000-13-01"), None);
    }
}
