// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure run-metric conversions and display formatting.
//!
//! Pace and speed are always derived from a (distance, duration) pair at the
//! point of use; nothing in the store keeps them alongside their inputs.

use crate::models::DistanceUnit;

/// Pace in minutes per unit distance.
///
/// Returns `None` when `distance` is not a positive finite number.
pub fn pace(distance: f64, duration_seconds: u32) -> Option<f64> {
    if !(distance.is_finite() && distance > 0.0) {
        return None;
    }
    Some(f64::from(duration_seconds) / 60.0 / distance)
}

/// Speed in unit distances per hour.
///
/// Returns `None` when `duration_seconds` is zero.
pub fn speed(distance: f64, duration_seconds: u32) -> Option<f64> {
    if duration_seconds == 0 {
        return None;
    }
    Some(distance / f64::from(duration_seconds) * 3600.0)
}

/// Format a pace as `M:SS/unit` (e.g. `5:00/km`).
///
/// Minutes are truncated from the pace, seconds rounded from the remainder.
/// A remainder that rounds to 60 carries into the minutes component, so
/// `4.999` renders as `5:00`, never `4:60`.
pub fn format_pace(pace: f64, unit: DistanceUnit) -> String {
    let mut minutes = pace.trunc() as u64;
    let mut seconds = ((pace - pace.trunc()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}:{:02}/{}", minutes, seconds, unit)
}

/// Format a duration as `Hh Mm Ss` when hours are present, else `Mm Ss`.
pub fn format_duration(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_and_speed_examples() {
        // 5 km in 25 minutes
        assert_eq!(pace(5.0, 1500), Some(5.0));
        assert_eq!(speed(5.0, 1500), Some(12.0));
    }

    #[test]
    fn test_pace_rejects_non_positive_distance() {
        assert_eq!(pace(0.0, 1500), None);
        assert_eq!(pace(-1.0, 1500), None);
        assert_eq!(pace(f64::NAN, 1500), None);
    }

    #[test]
    fn test_speed_rejects_zero_duration() {
        assert_eq!(speed(5.0, 0), None);
    }

    #[test]
    fn test_pace_speed_reciprocal() {
        // pace (min/unit) and speed (unit/h) describe the same rate,
        // so their product is 60 for any positive inputs.
        for distance in [0.5, 1.0, 3.3, 5.0, 10.0, 42.195] {
            for duration in [60u32, 900, 1500, 3600, 7201] {
                let p = pace(distance, duration).unwrap();
                let s = speed(distance, duration).unwrap();
                assert!(
                    (p * s - 60.0).abs() < 1e-9,
                    "pace * speed != 60 for d={} s={}",
                    distance,
                    duration
                );
            }
        }
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(5.0, DistanceUnit::Km), "5:00/km");
        assert_eq!(format_pace(4.5, DistanceUnit::Km), "4:30/km");
        assert_eq!(format_pace(6.25, DistanceUnit::Mi), "6:15/mi");
        // Seconds are rounded, not truncated
        assert_eq!(format_pace(5.5083, DistanceUnit::Km), "5:30/km");
    }

    #[test]
    fn test_format_pace_carries_rounded_seconds() {
        // 1799 s over 6 km is 4.99722... min/km; the remainder rounds to
        // 60 seconds and must roll over into the minutes.
        let p = pace(6.0, 1799).unwrap();
        assert_eq!(format_pace(p, DistanceUnit::Km), "5:00/km");
        assert_eq!(format_pace(4.9999, DistanceUnit::Km), "5:00/km");
        assert_eq!(format_pace(59.9999, DistanceUnit::Mi), "60:00/mi");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1500), "25m 0s");
        assert_eq!(format_duration(0), "0m 0s");
        assert_eq!(format_duration(59), "0m 59s");
        assert_eq!(format_duration(3600), "1h 0m 0s");
        assert_eq!(format_duration(3661), "1h 1m 1s");
        assert_eq!(format_duration(7384), "2h 3m 4s");
    }

    #[test]
    fn test_format_duration_round_trips() {
        // Reconstructing seconds from the printed components recovers the
        // input for every duration, with or without the hours part.
        for total in (0u32..10_000).chain([35_999, 36_000, 360_001]) {
            let printed = format_duration(total);
            let mut seconds = 0u32;
            for part in printed.split_whitespace() {
                let (value, suffix) = part.split_at(part.len() - 1);
                let value: u32 = value.parse().unwrap();
                seconds += match suffix {
                    "h" => value * 3600,
                    "m" => value * 60,
                    "s" => value,
                    _ => panic!("unexpected component {part}"),
                };
            }
            assert_eq!(seconds, total, "round-trip failed for {printed}");
        }
    }
}
