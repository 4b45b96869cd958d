//! Field access helpers over `serde_json::Value` trees

use crate::error::{FormatError, Result};
use isomap_core::{Property, PropertyBag, PropertyType, PropertyValue};
use serde_json::{json, Value};

pub(crate) fn field<'a>(obj: &'a Value, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn invalid(context: &'static str, name: &str, value: &Value) -> FormatError {
    FormatError::InvalidField {
        context,
        field: name.to_string(),
        value: value.to_string(),
    }
}

/// Non-negative integer, accepting integral floats such as `32.0`
fn as_u32(value: &Value) -> Option<u32> {
    if let Some(v) = value.as_u64() {
        return u32::try_from(v).ok();
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
        .map(|f| f as u32)
}

pub(crate) fn req_u32(
    obj: &Value,
    name: &'static str,
    context: &'static str,
) -> Result<u32> {
    let value = field(obj, name).ok_or(FormatError::MissingField {
        context,
        field: name,
    })?;
    as_u32(value).ok_or_else(|| invalid(context, name, value))
}

pub(crate) fn opt_u32(obj: &Value, name: &str, context: &'static str) -> Result<Option<u32>> {
    match field(obj, name) {
        None => Ok(None),
        Some(value) => as_u32(value)
            .map(Some)
            .ok_or_else(|| invalid(context, name, value)),
    }
}

pub(crate) fn opt_i64(obj: &Value, name: &str, context: &'static str) -> Result<Option<i64>> {
    match field(obj, name) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| invalid(context, name, value)),
    }
}

pub(crate) fn opt_f64(obj: &Value, name: &str, context: &'static str) -> Result<Option<f64>> {
    match field(obj, name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(context, name, value)),
    }
}

pub(crate) fn opt_bool(obj: &Value, name: &str, context: &'static str) -> Result<Option<bool>> {
    match field(obj, name) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(context, name, value)),
    }
}

pub(crate) fn opt_str<'a>(obj: &'a Value, name: &str) -> Option<&'a str> {
    field(obj, name).and_then(Value::as_str)
}

/// Array field; a missing field is an empty slice
pub(crate) fn array<'a>(obj: &'a Value, name: &str) -> &'a [Value] {
    field(obj, name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Parse a Tiled `properties` array; empty or absent yields `None`
pub(crate) fn parse_properties(obj: &Value) -> Option<PropertyBag> {
    let props = array(obj, "properties");
    if props.is_empty() {
        return None;
    }
    let mut bag = PropertyBag::new();
    for p in props {
        let Some(name) = opt_str(p, "name") else {
            tracing::debug!("Skipping property without a name");
            continue;
        };
        let ty = PropertyType::from_tag(opt_str(p, "type").unwrap_or("string"));
        let value = coerce_json(ty, field(p, "value").unwrap_or(&Value::Null));
        bag.insert(name.to_string(), Property::new(name, ty, value));
    }
    Some(bag)
}

/// Coerce a JSON property value according to its declared type
pub(crate) fn coerce_json(ty: PropertyType, value: &Value) -> PropertyValue {
    match (ty, value) {
        (PropertyType::Bool, Value::Bool(b)) => PropertyValue::Bool(*b),
        (PropertyType::Int, Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(PropertyValue::Int)
            .unwrap_or_else(|| PropertyValue::String(n.to_string())),
        (PropertyType::Float, Value::Number(n)) => n
            .as_f64()
            .map(PropertyValue::Float)
            .unwrap_or_else(|| PropertyValue::String(n.to_string())),
        (_, Value::String(s)) => PropertyValue::from_text(ty, s),
        (_, Value::Null) => PropertyValue::from_text(ty, ""),
        (_, other) => PropertyValue::from_text(ty, &other.to_string()),
    }
}

pub(crate) fn property_value_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Bool(b) => json!(b),
        PropertyValue::Int(i) => json!(i),
        PropertyValue::Float(f) => json!(f),
        PropertyValue::String(s) => json!(s),
    }
}

/// Write a property bag as a Tiled `properties` array
pub(crate) fn write_properties(bag: &PropertyBag) -> Value {
    Value::Array(
        bag.values()
            .map(|p| {
                json!({
                    "name": p.name,
                    "type": p.ty.as_str(),
                    "value": property_value_json(&p.value),
                })
            })
            .collect(),
    )
}

/// Insert `properties` into an object when the bag is non-empty
pub(crate) fn put_properties(obj: &mut Value, bag: Option<&PropertyBag>) {
    if let (Some(bag), Some(map)) = (bag.filter(|b| !b.is_empty()), obj.as_object_mut()) {
        map.insert("properties".to_string(), write_properties(bag));
    }
}
