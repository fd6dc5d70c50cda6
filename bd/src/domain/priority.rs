//! Priority levels for batch ordering

use serde::{Deserialize, Serialize};

/// Priority of an ingestion and its batches.
///
/// Batches persist the numeric weight (High=3, Medium=2, Low=1); ingestions
/// persist the label via [`label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    /// Numeric weight, higher dispatches first
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// Upper-case label as accepted at the ingestion boundary
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.weight()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            _ => Err(format!("Unknown priority weight: {}", value)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Serde adapter that stores a [`Priority`] as its label (`"HIGH"`)
pub mod label {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Priority;

    pub fn serialize<S: Serializer>(priority: &Priority, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(priority.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Priority, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(Priority::High.weight(), 3);
        assert_eq!(Priority::Medium.weight(), 2);
        assert_eq!(Priority::Low.weight(), 1);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("MEDIUM".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert!("medium".parse::<Priority>().is_err());
        assert!(" HIGH ".parse::<Priority>().is_err());
        assert!("URGENT".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde_is_numeric() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "3");

        let priority: Priority = serde_json::from_str("1").unwrap();
        assert_eq!(priority, Priority::Low);

        assert!(serde_json::from_str::<Priority>("7").is_err());
    }

    #[test]
    fn test_priority_label_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "label")]
            priority: Priority,
        }

        let json = serde_json::to_string(&Wrapper {
            priority: Priority::Medium,
        })
        .unwrap();
        assert_eq!(json, r#"{"priority":"MEDIUM"}"#);

        let parsed: Wrapper = serde_json::from_str(r#"{"priority":"LOW"}"#).unwrap();
        assert_eq!(parsed.priority, Priority::Low);
    }
}
