//! Item ids and per-item results

use serde::{Deserialize, Serialize};

/// Opaque client-supplied item id.
///
/// Serialized untagged so any JSON value round-trips as-is. Integers and
/// strings get their own variants; floats, booleans and integers outside the
/// `i64` range are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl ItemId {
    /// Parse a CLI argument: integers become `Int`, anything else `Text`
    pub fn parse_arg(s: &str) -> Self {
        s.parse::<i64>().map(Self::Int).unwrap_or_else(|_| Self::Text(s.to_string()))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Result of processing a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: ItemId,
    pub data: String,
}

impl ItemResult {
    pub fn new(id: ItemId, data: impl Into<String>) -> Self {
        Self { id, data: data.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg() {
        assert_eq!(ItemId::parse_arg("42"), ItemId::Int(42));
        assert_eq!(ItemId::parse_arg("-7"), ItemId::Int(-7));
        assert_eq!(ItemId::parse_arg("abc"), ItemId::Text("abc".to_string()));
        assert_eq!(ItemId::parse_arg("4.5"), ItemId::Text("4.5".to_string()));
    }

    #[test]
    fn test_untagged_serde() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[1, "two", 3]"#).unwrap();
        assert_eq!(ids, vec![ItemId::Int(1), ItemId::from("two"), ItemId::Int(3)]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[1,"two",3]"#);
    }

    #[test]
    fn test_other_json_values_kept_verbatim() {
        let json = r#"[1.5,true,18446744073709551615,null]"#;
        let ids: Vec<ItemId> = serde_json::from_str(json).unwrap();
        assert!(ids.iter().all(|id| matches!(id, ItemId::Other(_))));
        assert_eq!(serde_json::to_string(&ids).unwrap(), json);
        assert_eq!(ids[0].to_string(), "1.5");
        assert_eq!(ids[1].to_string(), "true");
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemId::Int(5).to_string(), "5");
        assert_eq!(ItemId::from("x").to_string(), "x");
    }
}
