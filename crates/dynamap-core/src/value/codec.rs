use crate::{
    model::entity::{Entity, EntityType},
    value::{AttributeValue, CodecError, Item, Number, SetValue, Value, WireTag},
};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

///
/// Encode
///
/// Structural conversion into the tagged wire format.
/// Already-tagged values encode to themselves.
///

pub trait Encode {
    fn encode(&self) -> Result<AttributeValue, CodecError>;
}

impl Encode for AttributeValue {
    fn encode(&self) -> Result<AttributeValue, CodecError> {
        Ok(self.clone())
    }
}

impl Encode for Value {
    fn encode(&self) -> Result<AttributeValue, CodecError> {
        match self {
            Self::Blob(bytes) => Ok(AttributeValue::B(bytes.clone())),
            Self::Bool(b) => Ok(AttributeValue::Bool(*b)),
            Self::Float(f) => Number::Float(*f).to_wire_text().map(AttributeValue::N),
            Self::Int(i) => Ok(AttributeValue::N(i.to_string())),
            Self::List(items) => items
                .iter()
                .map(Encode::encode)
                .collect::<Result<Vec<_>, _>>()
                .map(AttributeValue::L),
            Self::Map(fields) => encode_fields(fields).map(AttributeValue::M),
            Self::Null => Ok(AttributeValue::null()),
            Self::Set(set) => encode_set(set),
            Self::Text(s) => Ok(AttributeValue::S(s.clone())),
        }
    }
}

// Nested entity instances travel as maps of their fields.
impl Encode for Entity {
    fn encode(&self) -> Result<AttributeValue, CodecError> {
        encode_fields(self.fields()).map(AttributeValue::M)
    }
}

/// Encode any supported value into its wire form.
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<AttributeValue, CodecError> {
    value.encode()
}

/// Encode an untyped JSON value.
///
/// A single-key object whose key is a wire tag and whose payload matches
/// that tag is treated as already encoded and returned unchanged.
pub fn encode_json(json: &JsonValue) -> Result<AttributeValue, CodecError> {
    if let Some(tagged) = as_tagged(json) {
        return Ok(tagged);
    }

    match json {
        JsonValue::Null => Ok(AttributeValue::null()),
        JsonValue::Bool(b) => Ok(AttributeValue::Bool(*b)),
        JsonValue::Number(n) => {
            if let Some(int) = n.as_i64() {
                Ok(AttributeValue::N(int.to_string()))
            } else if n.is_u64() {
                // beyond i64 range; the literal text is exact
                Ok(AttributeValue::N(n.to_string()))
            } else {
                let float = n.as_f64().ok_or_else(|| CodecError::InvalidNumber {
                    text: n.to_string(),
                })?;
                Number::Float(float).to_wire_text().map(AttributeValue::N)
            }
        }
        JsonValue::String(s) => Ok(AttributeValue::S(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .map(encode_json)
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::L),
        JsonValue::Object(fields) => fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), encode_json(value)?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(AttributeValue::M),
    }
}

/// Encode an entity instance for a write, applying the type's
/// `before_encode` hook first.
pub fn encode_entity(entity: &Entity, ty: &EntityType) -> Result<Item, CodecError> {
    let entity = match ty.hooks.before_encode {
        Some(hook) => hook(entity.clone()),
        None => entity.clone(),
    };

    encode_fields(entity.fields())
}

/// Decode one wire value into a native value.
pub fn decode(wire: &AttributeValue) -> Result<Value, CodecError> {
    match wire {
        AttributeValue::B(bytes) => Ok(Value::Blob(bytes.clone())),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Bs(members) => {
            non_empty(members)?;
            Ok(Value::Set(SetValue::Blob(members.iter().cloned().collect())))
        }
        AttributeValue::L(items) => items
            .iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        AttributeValue::M(fields) => decode_item(fields).map(Value::Map),
        AttributeValue::N(text) => Number::parse(text).map(Value::from),
        AttributeValue::Ns(members) => {
            non_empty(members)?;
            let numbers = members
                .iter()
                .map(|text| Number::parse(text))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Set(SetValue::number(numbers)))
        }
        AttributeValue::Null(true) => Ok(Value::Null),
        AttributeValue::Null(false) => Err(CodecError::MalformedWire {
            shape: wire.to_json().to_string(),
        }),
        AttributeValue::S(s) => Ok(Value::Text(s.clone())),
        AttributeValue::Ss(members) => {
            non_empty(members)?;
            Ok(Value::Set(SetValue::Text(
                members.iter().cloned().collect::<BTreeSet<_>>(),
            )))
        }
    }
}

/// Decode every attribute of an item into a generic field map.
pub fn decode_item(item: &Item) -> Result<BTreeMap<String, Value>, CodecError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), decode(value)?)))
        .collect()
}

/// Decode a map-shaped wire value onto an entity type.
///
/// Declared fields come from the wire map when present, otherwise from the
/// field default. Unknown attributes are dropped. Fails only when the wire
/// value is not a map or one of its members is malformed.
pub fn decode_into(wire: &AttributeValue, ty: &EntityType) -> Result<Entity, CodecError> {
    match wire {
        AttributeValue::M(fields) => decode_item_into(fields, ty),
        other => Err(CodecError::NotAMap { tag: other.tag() }),
    }
}

/// Decode a stored item onto an entity type, applying the type's
/// `after_decode` hook last.
pub fn decode_item_into(item: &Item, ty: &EntityType) -> Result<Entity, CodecError> {
    let mut decoded = decode_item(item)?;
    let mut entity = Entity::empty(&ty.path);

    for field in &ty.fields {
        let value = decoded
            .remove(&field.name)
            .unwrap_or_else(|| field.default.clone());
        entity.insert(field.name.clone(), value);
    }

    Ok(match ty.hooks.after_decode {
        Some(hook) => hook(entity),
        None => entity,
    })
}

fn encode_fields(fields: &BTreeMap<String, Value>) -> Result<Item, CodecError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), value.encode()?)))
        .collect()
}

fn encode_set(set: &SetValue) -> Result<AttributeValue, CodecError> {
    if set.is_empty() {
        return Err(CodecError::EmptySet);
    }

    match set {
        SetValue::Blob(members) => Ok(AttributeValue::Bs(members.iter().cloned().collect())),
        SetValue::Number(members) => members
            .iter()
            .map(|n| n.to_wire_text())
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::Ns),
        SetValue::Text(members) => Ok(AttributeValue::Ss(members.iter().cloned().collect())),
    }
}

fn non_empty<T>(members: &[T]) -> Result<(), CodecError> {
    if members.is_empty() {
        Err(CodecError::EmptySet)
    } else {
        Ok(())
    }
}

// Recognise a JSON object that is already in tagged wire form.
fn as_tagged(json: &JsonValue) -> Option<AttributeValue> {
    let JsonValue::Object(object) = json else {
        return None;
    };
    if object.len() != 1 {
        return None;
    }
    let (tag, _) = object.iter().next()?;
    WireTag::parse(tag)?;

    AttributeValue::try_from_json(json).ok()
}
