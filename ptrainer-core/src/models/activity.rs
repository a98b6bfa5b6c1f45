use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activities offered when booking a training session.
///
/// Trainings read from the server keep their activity as free text, since the
/// server accepts any value; this list only constrains new input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Yoga,
    Running,
    Swimming,
    Gym,
    Cycling,
    Boxing,
}

impl Activity {
    pub const ALL: [Activity; 6] = [
        Activity::Yoga,
        Activity::Running,
        Activity::Swimming,
        Activity::Gym,
        Activity::Cycling,
        Activity::Boxing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Yoga => "Yoga",
            Activity::Running => "Running",
            Activity::Swimming => "Swimming",
            Activity::Gym => "Gym",
            Activity::Cycling => "Cycling",
            Activity::Boxing => "Boxing",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|activity| activity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let options: Vec<&str> = Activity::ALL.iter().map(Activity::as_str).collect();
                format!(
                    "Invalid activity '{}'. Valid options: {}",
                    s,
                    options.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_display() {
        assert_eq!(format!("{}", Activity::Yoga), "Yoga");
        assert_eq!(format!("{}", Activity::Boxing), "Boxing");
    }

    #[test]
    fn test_activity_from_str() {
        assert_eq!(Activity::from_str("yoga").unwrap(), Activity::Yoga);
        assert_eq!(Activity::from_str("RUNNING").unwrap(), Activity::Running);
        assert_eq!(Activity::from_str(" Gym ").unwrap(), Activity::Gym);
    }

    #[test]
    fn test_activity_from_str_invalid() {
        let err = Activity::from_str("Zumba").unwrap_err();
        assert!(err.contains("Yoga, Running, Swimming, Gym, Cycling, Boxing"));
        assert!(Activity::from_str("").is_err());
    }
}
