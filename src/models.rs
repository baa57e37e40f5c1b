//models.rs
use serde::{Deserialize, Serialize};

/// The SuperSlow "Big Five" machine exercises that seed every session.
pub const DEFAULT_EXERCISES: [&str; 5] = [
    "Leg Press",
    "Chest Press",
    "Pulldown",
    "Overhead Press",
    "Seated Row",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub elapsed_seconds: u32,
    pub lap_seconds: u32,
    pub weight: String,
}

impl Exercise {
    pub fn new(name: &str) -> Self {
        Exercise {
            name: name.to_string(),
            elapsed_seconds: 0,
            lap_seconds: 0,
            weight: String::new(),
        }
    }

    /// Weight as a number for improvement comparisons. Empty or
    /// non-numeric text becomes NaN, which never compares greater.
    pub fn weight_value(&self) -> f64 {
        self.weight.trim().parse().unwrap_or(f64::NAN)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub timestamp: String,
    pub exercises: Vec<Exercise>,
}

pub fn default_session() -> Vec<Exercise> {
    DEFAULT_EXERCISES.iter().map(|name| Exercise::new(name)).collect()
}

/// Formats whole seconds as zero-padded mm:ss. Minutes grow past 59
/// rather than rolling into hours.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parses "mm:ss" edit text. Both components must parse as integers;
/// anything else yields None and the edit is dropped.
pub fn parse_mmss(text: &str) -> Option<u32> {
    let mut parts = text.splitn(2, ':');
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    let seconds: u32 = parts.next()?.trim().parse().ok()?;
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(3661), "61:01");
    }

    #[test]
    fn test_parse_mmss_valid() {
        assert_eq!(parse_mmss("01:30"), Some(90));
        assert_eq!(parse_mmss("00:00"), Some(0));
        assert_eq!(parse_mmss("61:01"), Some(3661));
    }

    #[test]
    fn test_parse_mmss_invalid() {
        assert_eq!(parse_mmss("abc"), None);
        assert_eq!(parse_mmss("1:ss"), None);
        assert_eq!(parse_mmss(""), None);
        assert_eq!(parse_mmss("90"), None);
    }

    #[test]
    fn test_weight_value_non_numeric_is_nan() {
        let mut ex = Exercise::new("Leg Press");
        ex.weight = "heavy".to_string();
        assert!(ex.weight_value().is_nan());
        ex.weight = String::new();
        assert!(ex.weight_value().is_nan());
        ex.weight = "135".to_string();
        assert_eq!(ex.weight_value(), 135.0);
    }

    #[test]
    fn test_default_session_roster() {
        let session = default_session();
        assert_eq!(session.len(), 5);
        assert!(session.iter().all(|e| e.elapsed_seconds == 0 && e.weight.is_empty()));
    }
}
