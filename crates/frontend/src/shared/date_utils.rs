/// Utilities for date and time formatting
///
/// Cache timestamps arrive as naive ISO strings from the query API; durations
/// are client-side millisecond differences.
use chrono::NaiveDateTime;

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Parse a naive ISO datetime, with or without fractional seconds / trailing `Z`.
pub fn parse_datetime(datetime_str: &str) -> Option<NaiveDateTime> {
    let trimmed = datetime_str.trim().trim_end_matches('Z');
    ISO_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Format ISO datetime string to DD.MM.YYYY HH:MM:SS format
/// Example: "2024-03-15T14:02:26.123Z" -> "15.03.2024 14:02:26"
pub fn format_datetime(datetime_str: &str) -> String {
    match parse_datetime(datetime_str) {
        Some(dt) => dt.format("%d.%m.%Y %H:%M:%S").to_string(),
        None => datetime_str.to_string(),
    }
}

/// Tooltip for the "cached" badge in a chart header.
pub fn cached_tooltip(cached_dttm: Option<&str>) -> String {
    match cached_dttm {
        Some(dttm) => format!("Cached {}. Click to force-refresh", format_datetime(dttm)),
        None => "Cached. Click to force-refresh".to_string(),
    }
}

/// Query duration: "0.42 sec" below a minute, "MM:SS.ss" above.
pub fn format_duration_ms(ms: f64) -> String {
    let secs = (ms.max(0.0)) / 1000.0;
    if secs < 60.0 {
        format!("{:.2} sec", secs)
    } else {
        let minutes = (secs / 60.0).floor() as u64;
        let rest = secs - (minutes as f64) * 60.0;
        format!("{:02}:{:05.2}", minutes, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        assert_eq!(
            format_datetime("2024-03-15T14:02:26.123Z"),
            "15.03.2024 14:02:26"
        );
        assert_eq!(
            format_datetime("2024-12-31T23:59:59"),
            "31.12.2024 23:59:59"
        );
        assert_eq!(
            format_datetime("2024-12-31 23:59:59"),
            "31.12.2024 23:59:59"
        );
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(format_datetime("invalid"), "invalid");
        assert!(parse_datetime("2024-03-15").is_none());
    }

    #[test]
    fn test_cached_tooltip() {
        assert_eq!(
            cached_tooltip(Some("2018-03-15T14:02:26")),
            "Cached 15.03.2018 14:02:26. Click to force-refresh"
        );
        assert_eq!(cached_tooltip(None), "Cached. Click to force-refresh");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(420.0), "0.42 sec");
        assert_eq!(format_duration_ms(1500.0), "1.50 sec");
        assert_eq!(format_duration_ms(65_320.0), "01:05.32");
        assert_eq!(format_duration_ms(-5.0), "0.00 sec");
    }
}
