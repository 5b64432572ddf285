//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Like [`format_duration`] but keeps the sign of negative values, which
/// only arise from inconsistent stored timestamps.
pub fn format_signed_duration(secs: i64) -> String {
    if secs < 0 {
        format!("-{}", format_duration(secs.unsigned_abs()))
    } else {
        format_duration(secs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
        assert_eq!(format_duration(90000), "1d 1h");
    }

    #[test]
    fn negative_durations_keep_sign() {
        assert_eq!(format_signed_duration(-30), "-30s");
        assert_eq!(format_signed_duration(61), "1m 1s");
    }
}
