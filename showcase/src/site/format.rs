//! Display formatting helpers.

use chrono::{DateTime, Utc};

/// Formats a count compactly: `999`, `1.2K`, `12K`, `3.4M`.
pub fn compact_number(n: u64) -> String {
    const UNITS: &[(u64, &str)] = &[(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    for &(scale, suffix) in UNITS {
        if n >= scale {
            let whole = n / scale;
            if whole >= 10 {
                return format!("{whole}{suffix}");
            }
            let tenths = (n % scale) * 10 / scale;
            return if tenths == 0 {
                format!("{whole}{suffix}")
            } else {
                format!("{whole}.{tenths}{suffix}")
            };
        }
    }

    n.to_string()
}

/// Formats a date as `Aug 07, 2026`, or an em dash when missing.
pub fn short_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => "\u{2014}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn compact_number_spans_magnitudes() {
        assert_eq!(compact_number(0), "0");
        assert_eq!(compact_number(999), "999");
        assert_eq!(compact_number(1_000), "1K");
        assert_eq!(compact_number(1_234), "1.2K");
        assert_eq!(compact_number(9_950), "9.9K");
        assert_eq!(compact_number(12_345), "12K");
        assert_eq!(compact_number(1_200_000), "1.2M");
        assert_eq!(compact_number(2_000_000_000), "2B");
    }

    #[test]
    fn short_date_formats_or_dashes() {
        let date = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(short_date(Some(&date)), "Aug 07, 2026");
        assert_eq!(short_date(None), "\u{2014}");
    }
}
