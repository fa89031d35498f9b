//! Presentation helpers shared by the dashboards
//!
//! All functions are pure. Missing inputs format as zero (or as an empty string
//! for timestamps) so a dashboard that has not loaded yet still renders.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Format an amount as whole euros the way the Greek locale does: `1.235 €`
///
/// Rounds half away from zero. `None`, NaN and infinities format as `0 €`.
pub fn format_currency(value: Option<f64>) -> String {
    let rounded = finite_or_zero(value).round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}{}\u{a0}€", group_thousands(&digits, '.'))
}

/// Format a percentage with one decimal: `12.3%`
///
/// Exact ties round away from zero (`0.25` is `0.3%`), other values round to
/// the nearest tenth of their exact binary value. `-0.0` prints as `0.0%`.
pub fn format_percent(value: Option<f64>) -> String {
    let value = finite_or_zero(value);
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{:.1}%", tenths_half_up(value.abs()))
}

/// `magnitude` with an exact hundredths tie pushed up to the next tenth
fn tenths_half_up(magnitude: f64) -> f64 {
    let scaled = magnitude * 10.0;
    // the product is exact only when the fused residue is zero
    let exact = magnitude.mul_add(10.0, -scaled) == 0.0;
    if exact && scaled.fract() == 0.5 {
        scaled.ceil() / 10.0
    } else {
        magnitude
    }
}

/// Relative age of a backend timestamp, e.g. `5m ago`
///
/// Returns an empty string when the timestamp is missing or unparseable.
pub fn format_time_ago(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    timestamp
        .and_then(parse_timestamp)
        .map(|then| format_elapsed((now - then).num_seconds()))
        .unwrap_or_default()
}

/// Bucket an elapsed number of seconds
///
/// Each bucket floors: 119 seconds is `1m ago`. Negative values (timestamps in
/// the future) read as `just now`.
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < SECONDS_PER_MINUTE {
        "just now".to_string()
    } else if seconds < SECONDS_PER_HOUR {
        format!("{}m ago", seconds / SECONDS_PER_MINUTE)
    } else if seconds < SECONDS_PER_DAY {
        format!("{}h ago", seconds / SECONDS_PER_HOUR)
    } else {
        format!("{}d ago", seconds / SECONDS_PER_DAY)
    }
}

/// Parse the timestamp shapes the backend emits
///
/// Odoo serializes datetimes as naive UTC `YYYY-MM-DD HH:MM:SS`, optionally with
/// microseconds. RFC 3339, `T`-separated naive datetimes and bare dates are
/// accepted too; naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(0, "just now")]
    #[case(59, "just now")]
    #[case(60, "1m ago")]
    #[case(119, "1m ago")]
    #[case(3_599, "59m ago")]
    #[case(3_600, "1h ago")]
    #[case(86_399, "23h ago")]
    #[case(86_400, "1d ago")]
    #[case(86_400 * 9 + 5, "9d ago")]
    #[case(-30, "just now")]
    fn test_format_elapsed_buckets(#[case] seconds: i64, #[case] expected: &str) {
        assert_eq!(format_elapsed(seconds), expected);
    }

    #[test]
    fn test_time_ago_from_odoo_timestamp() {
        let then = (now() - Duration::seconds(3_600)).format("%Y-%m-%d %H:%M:%S");
        assert_eq!(format_time_ago(Some(&then.to_string()), now()), "1h ago");
    }

    #[test]
    fn test_time_ago_missing_or_garbage_is_empty() {
        assert_eq!(format_time_ago(None, now()), "");
        assert_eq!(format_time_ago(Some(""), now()), "");
        assert_eq!(format_time_ago(Some("yesterday-ish"), now()), "");
    }

    #[rstest]
    #[case("2024-06-15 11:59:00", 60)]
    #[case("2024-06-15 11:59:00.250000", 59)]
    #[case("2024-06-15T11:00:00", 3_600)]
    #[case("2024-06-15T13:00:00+02:00", 3_600)]
    #[case("2024-06-15T11:00:00Z", 3_600)]
    #[case("2024-06-14", 129_600)]
    fn test_parse_timestamp_shapes(#[case] input: &str, #[case] elapsed: i64) {
        let parsed = parse_timestamp(input).unwrap();
        assert_eq!((now() - parsed).num_seconds(), elapsed);
    }

    #[rstest]
    #[case(Some(1234.6), "1.235\u{a0}€")]
    #[case(Some(1234.4), "1.234\u{a0}€")]
    #[case(Some(0.5), "1\u{a0}€")]
    #[case(Some(999.0), "999\u{a0}€")]
    #[case(Some(1_000_000.0), "1.000.000\u{a0}€")]
    #[case(Some(-2500.0), "-2.500\u{a0}€")]
    #[case(None, "0\u{a0}€")]
    #[case(Some(f64::NAN), "0\u{a0}€")]
    fn test_format_currency(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_currency(value), expected);
    }

    #[rstest]
    #[case(Some(12.34), "12.3%")]
    #[case(Some(99.96), "100.0%")]
    #[case(Some(0.25), "0.3%")]
    #[case(Some(12.25), "12.3%")]
    #[case(Some(-0.25), "-0.3%")]
    #[case(Some(0.15), "0.1%")]
    #[case(Some(-12.34), "-12.3%")]
    #[case(Some(0.0), "0.0%")]
    #[case(Some(-0.0), "0.0%")]
    #[case(None, "0.0%")]
    fn test_format_percent(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_percent(value), expected);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1", '.'), "1");
        assert_eq!(group_thousands("123", '.'), "123");
        assert_eq!(group_thousands("1234", '.'), "1.234");
        assert_eq!(group_thousands("123456", '.'), "123.456");
        assert_eq!(group_thousands("1234567", '.'), "1.234.567");
    }
}
