//! Human-readable byte counts for card captions.

const THRESHOLD: f64 = 1024.0;
const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Format a byte count for display.
///
/// - `None` → `""` (size unknown, caption shows nothing)
/// - below 1024 → whole bytes, e.g. `"512 B"`
/// - otherwise the largest unit up to TB keeping the value below 1024,
///   with one decimal place, e.g. `"1.5 KB"`
pub fn format_bytes(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return String::new();
    };
    if (bytes as f64) < THRESHOLD {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    loop {
        value /= THRESHOLD;
        if value < THRESHOLD || unit == UNITS.len() - 1 {
            break;
        }
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiplier(unit: &str) -> f64 {
        match unit {
            "B" => 1.0,
            "KB" => 1024.0,
            "MB" => 1024.0_f64.powi(2),
            "GB" => 1024.0_f64.powi(3),
            "TB" => 1024.0_f64.powi(4),
            other => panic!("unexpected unit {other}"),
        }
    }

    #[test]
    fn unknown_size_is_empty() {
        assert_eq!(format_bytes(None), "");
    }

    #[test]
    fn zero_is_bytes() {
        assert_eq!(format_bytes(Some(0)), "0 B");
    }

    #[test]
    fn below_threshold_has_no_decimal() {
        assert_eq!(format_bytes(Some(1023)), "1023 B");
    }

    #[test]
    fn exact_kilobyte() {
        assert_eq!(format_bytes(Some(1024)), "1.0 KB");
    }

    #[test]
    fn fractional_kilobytes() {
        assert_eq!(format_bytes(Some(1536)), "1.5 KB");
    }

    #[test]
    fn megabytes_and_gigabytes() {
        assert_eq!(format_bytes(Some(5 * 1024 * 1024)), "5.0 MB");
        assert_eq!(format_bytes(Some(3 * 1024 * 1024 * 1024)), "3.0 GB");
    }

    #[test]
    fn capped_at_terabytes() {
        let five_pb = 5 * 1024_u64.pow(5);
        assert_eq!(format_bytes(Some(five_pb)), "5120.0 TB");
    }

    #[test]
    fn reparsed_value_is_close_to_input() {
        for bytes in [0, 1, 999, 1024, 4096, 123_456, 9_876_543, 1 << 33, 1 << 41] {
            let text = format_bytes(Some(bytes));
            let (number, unit) = text.split_once(' ').unwrap();
            let number: f64 = number.parse().unwrap();
            let m = multiplier(unit);
            let back = number * m;
            // One decimal place: error bounded by half a tenth of the unit.
            assert!(
                (back - bytes as f64).abs() <= 0.05 * m,
                "{bytes} formatted as {text}"
            );
            if unit != "TB" {
                assert!(number < 1024.0, "{bytes} formatted as {text}");
            }
        }
    }
}
