//! Display formatting for durations and sizes.

use std::time::Duration;

/// Render as `HH:MM:SS`, rounded to the nearest second. Hours are not capped.
pub fn duration_hhmmss(duration: Duration) -> String {
    let secs = duration.as_secs() + u64::from(duration.subsec_millis() >= 500);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Render a byte count in binary units with one decimal (`1.5 MiB`).
///
/// Counts below 1 KiB are shown as whole bytes.
pub fn human_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_hhmmss() {
        assert_eq!(duration_hhmmss(Duration::ZERO), "00:00:00");
        assert_eq!(duration_hhmmss(Duration::from_secs(110)), "00:01:50");
        assert_eq!(duration_hhmmss(Duration::from_millis(59_500)), "00:01:00");
        assert_eq!(duration_hhmmss(Duration::from_millis(59_499)), "00:00:59");
        assert_eq!(duration_hhmmss(Duration::from_secs(100 * 3600 + 61)), "100:01:01");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(1024), "1.0 KiB");
        assert_eq!(human_bytes(1_048_576), "1.0 MiB");
        assert_eq!(human_bytes(1_572_864), "1.5 MiB");
        assert_eq!(human_bytes(5 * 1024u64.pow(5)), "5120.0 TiB");
    }
}
