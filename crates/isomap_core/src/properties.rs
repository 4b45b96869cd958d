//! Typed custom properties attached to maps, layers, objects and tiles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property bag keyed by property name
pub type PropertyBag = BTreeMap<String, Property>;

/// The declared type of a custom property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Color,
    File,
    Object,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Int => "int",
            PropertyType::Float => "float",
            PropertyType::Bool => "bool",
            PropertyType::Color => "color",
            PropertyType::File => "file",
            PropertyType::Object => "object",
        }
    }

    /// Parse a type tag, treating unknown tags as plain strings
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "int" => PropertyType::Int,
            "float" => PropertyType::Float,
            "bool" => PropertyType::Bool,
            "color" => PropertyType::Color,
            "file" => PropertyType::File,
            "object" => PropertyType::Object,
            "string" => PropertyType::String,
            other => {
                tracing::debug!("Unknown property type '{}', treating as string", other);
                PropertyType::String
            }
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Coerce a textual value according to its declared type.
    ///
    /// `bool` is true only for `"true"`; `int` and `float` fall back to the
    /// raw string when the text is not numeric.
    pub fn from_text(ty: PropertyType, text: &str) -> Self {
        match ty {
            PropertyType::Bool => PropertyValue::Bool(text == "true"),
            PropertyType::Int => parse_int(text)
                .map(PropertyValue::Int)
                .unwrap_or_else(|| PropertyValue::String(text.to_string())),
            PropertyType::Float => text
                .trim()
                .parse::<f64>()
                .map(PropertyValue::Float)
                .unwrap_or_else(|_| PropertyValue::String(text.to_string())),
            _ => PropertyValue::String(text.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

/// Integer parse that accepts a fractional part and truncates it
fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

/// A named, typed custom property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: PropertyType, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            ty,
            value,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, PropertyType::String, PropertyValue::String(value.into()))
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, PropertyType::Int, PropertyValue::Int(value))
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, PropertyType::Float, PropertyValue::Float(value))
    }

    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, PropertyType::Bool, PropertyValue::Bool(value))
    }
}

/// Insert a property into a bag keyed by its own name
pub fn insert_property(bag: &mut PropertyBag, property: Property) {
    bag.insert(property.name.clone(), property);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PropertyType::Bool, "true", PropertyValue::Bool(true))]
    #[test_case(PropertyType::Bool, "1", PropertyValue::Bool(false))]
    #[test_case(PropertyType::Int, "42", PropertyValue::Int(42))]
    #[test_case(PropertyType::Int, "7.9", PropertyValue::Int(7))]
    #[test_case(PropertyType::Float, "2.5", PropertyValue::Float(2.5))]
    #[test_case(PropertyType::Color, "#ff00ff00", PropertyValue::String("#ff00ff00".into()))]
    #[test_case(PropertyType::Int, "many", PropertyValue::String("many".into()))]
    fn test_from_text(ty: PropertyType, text: &str, expected: PropertyValue) {
        assert_eq!(PropertyValue::from_text(ty, text), expected);
    }

    #[test]
    fn test_unknown_type_tag_is_string() {
        assert_eq!(PropertyType::from_tag("class"), PropertyType::String);
        assert_eq!(PropertyType::from_tag("float"), PropertyType::Float);
    }

    #[test]
    fn test_display_matches_text_form() {
        assert_eq!(PropertyValue::Float(2.0).to_string(), "2");
        assert_eq!(PropertyValue::Float(0.25).to_string(), "0.25");
        assert_eq!(PropertyValue::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_serde_keeps_numeric_kind() {
        let prop = Property::float("speed", 1.0);
        let json = serde_json::to_string(&prop).unwrap();
        assert_eq!(json, r#"{"name":"speed","type":"float","value":1.0}"#);
        let back: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prop);
    }
}
