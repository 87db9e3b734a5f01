use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Countdown label shown in the exam header, e.g. `05:07`. Minutes are not wrapped into hours.
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Time taken as shown on result cards: `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_elapsed(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

pub fn format_offset(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, PrimitiveDateTime, Time, UtcOffset};

    #[test]
    fn format_countdown_pads_minutes_and_seconds() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(59), "00:59");
        assert_eq!(format_countdown(307), "05:07");
        assert_eq!(format_countdown(90 * 60), "90:00");
        assert_eq!(format_countdown(125 * 60 + 1), "125:01");
    }

    #[test]
    fn format_elapsed_drops_leading_zero_units() {
        assert_eq!(format_elapsed(3), "3s");
        assert_eq!(format_elapsed(123), "2m 3s");
        assert_eq!(format_elapsed(3723), "1h 2m 3s");
        assert_eq!(format_elapsed(3600), "1h 0m 0s");
    }

    #[test]
    fn format_offset_preserves_offset() {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        let utc = PrimitiveDateTime::new(date, time).assume_utc();
        let offset = UtcOffset::from_hms(3, 0, 0).unwrap();
        let shifted = utc.to_offset(offset);
        assert_eq!(format_offset(shifted), "2025-01-02T13:20:30+03:00");
    }
}
