//! Variant attributes

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl AttributeValue {
    /// Parses a raw value, preferring booleans, then integers, then strings
    pub fn parse(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            AttributeValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            AttributeValue::Int(i)
        } else {
            AttributeValue::String(raw.to_string())
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

/// Attributes identifying one variant of a component
///
/// Keys are kept sorted so that two containers with the same pairs compare
/// and hash equal regardless of how they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeContainer {
    attributes: BTreeMap<String, AttributeValue>,
}

impl AttributeContainer {
    /// An empty container
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds an attribute (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up an attribute
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns true if every pair in `requested` is present here with an equal value
    pub fn contains_all(&self, requested: &AttributeContainer) -> bool {
        requested
            .attributes
            .iter()
            .all(|(k, v)| self.attributes.get(k) == Some(v))
    }

    /// Iterates over the attributes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeContainer {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for AttributeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// Parse a `key=value` attribute filter
pub fn parse_attribute(s: &str) -> Result<(String, AttributeValue), ConfigError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), AttributeValue::parse(value.trim())))
        }
        _ => Err(ConfigError::InvalidAttribute {
            value: s.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> AttributeContainer {
        AttributeContainer::empty()
            .with("org.gradle.usage", "java-runtime")
            .with("org.gradle.jvm.version", 17_i64)
    }

    #[test]
    fn test_attribute_value_parse() {
        assert_eq!(AttributeValue::parse("true"), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::parse("17"), AttributeValue::Int(17));
        assert_eq!(
            AttributeValue::parse("java-api"),
            AttributeValue::String("java-api".to_string())
        );
    }

    #[test]
    fn test_container_equality_ignores_insertion_order() {
        let a = AttributeContainer::empty().with("a", "1").with("b", true);
        let b = AttributeContainer::empty().with("b", true).with("a", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_container_get() {
        let attrs = runtime();
        assert_eq!(
            attrs.get("org.gradle.usage"),
            Some(&AttributeValue::String("java-runtime".to_string()))
        );
        assert_eq!(attrs.get("missing"), None);
        assert_eq!(attrs.len(), 2);
        assert!(!attrs.is_empty());
    }

    #[test]
    fn test_contains_all() {
        let attrs = runtime();
        let wanted = AttributeContainer::empty().with("org.gradle.usage", "java-runtime");
        let other = AttributeContainer::empty().with("org.gradle.usage", "java-api");
        assert!(attrs.contains_all(&wanted));
        assert!(attrs.contains_all(&AttributeContainer::empty()));
        assert!(!attrs.contains_all(&other));
    }

    #[test]
    fn test_display() {
        let attrs = AttributeContainer::empty().with("b", 2_i64).with("a", "x");
        assert_eq!(format!("{}", attrs), "{a=x, b=2}");
        assert_eq!(format!("{}", AttributeContainer::empty()), "{}");
    }

    #[test]
    fn test_parse_attribute() {
        let (k, v) = parse_attribute("org.gradle.usage=java-api").unwrap();
        assert_eq!(k, "org.gradle.usage");
        assert_eq!(v, AttributeValue::String("java-api".to_string()));

        assert!(parse_attribute("no-equals").is_err());
        assert!(parse_attribute("=value").is_err());
    }

    #[test]
    fn test_serde_container() {
        let json = r#"{"org.gradle.usage": "java-runtime", "jvm": 17, "docs": false}"#;
        let attrs: AttributeContainer = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.get("jvm"), Some(&AttributeValue::Int(17)));
        assert_eq!(attrs.get("docs"), Some(&AttributeValue::Bool(false)));
    }
}
