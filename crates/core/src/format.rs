#![forbid(unsafe_code)]

use chrono::{DateTime, Local, TimeZone, Utc};

/// Placeholder shown for absent dates.
pub const NO_DATE: &str = "-";

const DATE_FMT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Render a server timestamp in the local timezone, or `-` when absent.
pub fn format_date_string(date: Option<&DateTime<Utc>>) -> String {
    format_date_in(date, &Local)
}

pub fn format_date_in<Tz: TimeZone>(date: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match date {
        Some(d) => d.with_timezone(tz).format(DATE_FMT).to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Force a possibly multi-line description onto a single line.
pub fn inline_description(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_date_is_dash() {
        assert_eq!(format_date_string(None), "-");
    }

    #[test]
    fn formats_in_given_zone() {
        let d = DateTime::parse_from_rfc3339("2021-03-04T15:06:07Z").unwrap().with_timezone(&Utc);
        assert_eq!(format_date_in(Some(&d), &Utc), "3/4/2021, 3:06:07 PM");
        let d = DateTime::parse_from_rfc3339("2021-11-24T00:00:09Z").unwrap().with_timezone(&Utc);
        assert_eq!(format_date_in(Some(&d), &Utc), "11/24/2021, 12:00:09 AM");
    }

    #[test]
    fn inline_collapses_whitespace() {
        assert_eq!(inline_description("line one\n\n  line two\t!"), "line one line two !");
        assert_eq!(inline_description(""), "");
    }
}
