use crate::value::{CodecError, Number};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

///
/// Item
/// Top-level attribute map of one stored record.
///

pub type Item = BTreeMap<String, AttributeValue>;

///
/// AttributeValue
///
/// The store's tagged wire value. Exactly one tag is active.
/// Numbers travel as decimal text and binaries as Base64 text; the
/// in-memory `B`/`BS` payloads hold the decoded bytes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum AttributeValue {
    B(Vec<u8>),
    Bool(bool),
    Bs(Vec<Vec<u8>>),
    L(Vec<Self>),
    M(BTreeMap<String, Self>),
    N(String),
    Ns(Vec<String>),
    /// Payload is always `true` on the wire.
    Null(bool),
    S(String),
    Ss(Vec<String>),
}

impl AttributeValue {
    #[must_use]
    pub const fn null() -> Self {
        Self::Null(true)
    }

    #[must_use]
    pub const fn tag(&self) -> WireTag {
        match self {
            Self::B(_) => WireTag::B,
            Self::Bool(_) => WireTag::Bool,
            Self::Bs(_) => WireTag::Bs,
            Self::L(_) => WireTag::L,
            Self::M(_) => WireTag::M,
            Self::N(_) => WireTag::N,
            Self::Ns(_) => WireTag::Ns,
            Self::Null(_) => WireTag::Null,
            Self::S(_) => WireTag::S,
            Self::Ss(_) => WireTag::Ss,
        }
    }

    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_m(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::M(fields) => Some(fields),
            _ => None,
        }
    }

    /// Parse the JSON wire form (`{"S": "..."}`) into an attribute value.
    ///
    /// The object must carry exactly one known tag whose payload matches
    /// the tag's shape.
    pub fn try_from_json(json: &JsonValue) -> Result<Self, CodecError> {
        let malformed = || CodecError::MalformedWire {
            shape: json.to_string(),
        };

        let JsonValue::Object(object) = json else {
            return Err(malformed());
        };
        let mut entries = object.iter();
        let (Some((tag, payload)), None) = (entries.next(), entries.next()) else {
            return Err(malformed());
        };
        let tag = WireTag::parse(tag).ok_or_else(|| CodecError::UnknownTag { tag: tag.clone() })?;

        match (tag, payload) {
            (WireTag::S, JsonValue::String(s)) => Ok(Self::S(s.clone())),
            (WireTag::N, JsonValue::String(s)) => {
                Number::parse(s)?;
                Ok(Self::N(s.clone()))
            }
            (WireTag::Bool, JsonValue::Bool(b)) => Ok(Self::Bool(*b)),
            (WireTag::Null, JsonValue::Bool(true)) => Ok(Self::null()),
            (WireTag::B, JsonValue::String(s)) => decode_base64(s).map(Self::B),
            (WireTag::Ss, JsonValue::Array(items)) => {
                json_strings(items).ok_or_else(malformed).map(Self::Ss)
            }
            (WireTag::Ns, JsonValue::Array(items)) => {
                let members = json_strings(items).ok_or_else(malformed)?;
                for member in &members {
                    Number::parse(member)?;
                }
                Ok(Self::Ns(members))
            }
            (WireTag::Bs, JsonValue::Array(items)) => {
                let members = json_strings(items).ok_or_else(malformed)?;
                members
                    .iter()
                    .map(|s| decode_base64(s))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Bs)
            }
            (WireTag::L, JsonValue::Array(items)) => items
                .iter()
                .map(Self::try_from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::L),
            (WireTag::M, JsonValue::Object(fields)) => json_fields(fields).map(Self::M),
            _ => Err(malformed()),
        }
    }

    /// Render the JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let payload = match self {
            Self::B(bytes) => JsonValue::String(BASE64.encode(bytes)),
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Bs(members) => members
                .iter()
                .map(|b| JsonValue::String(BASE64.encode(b)))
                .collect(),
            Self::L(items) => items.iter().map(Self::to_json).collect(),
            Self::M(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::N(text) | Self::S(text) => JsonValue::String(text.clone()),
            Self::Ns(members) | Self::Ss(members) => {
                members.iter().cloned().map(JsonValue::String).collect()
            }
            Self::Null(_) => JsonValue::Bool(true),
        };

        let mut object = JsonMap::with_capacity(1);
        object.insert(self.tag().as_str().to_string(), payload);

        JsonValue::Object(object)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;

        Self::try_from_json(&json).map_err(serde::de::Error::custom)
    }
}

///
/// WireTag
///
/// The ten wire tag codes. Names are part of the store contract.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WireTag {
    B,
    Bool,
    Bs,
    L,
    M,
    N,
    Ns,
    Null,
    S,
    Ss,
}

impl WireTag {
    pub const ALL: [Self; 10] = [
        Self::B,
        Self::Bool,
        Self::Bs,
        Self::L,
        Self::M,
        Self::N,
        Self::Ns,
        Self::Null,
        Self::S,
        Self::Ss,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::Bool => "BOOL",
            Self::Bs => "BS",
            Self::L => "L",
            Self::M => "M",
            Self::N => "N",
            Self::Ns => "NS",
            Self::Null => "NULL",
            Self::S => "S",
            Self::Ss => "SS",
        }
    }

    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a JSON object of attribute values (a stored item).
pub fn item_from_json(json: &JsonValue) -> Result<Item, CodecError> {
    match json {
        JsonValue::Object(fields) => json_fields(fields),
        other => Err(CodecError::MalformedWire {
            shape: other.to_string(),
        }),
    }
}

/// Render an item as a JSON object of attribute values.
#[must_use]
pub fn item_to_json(item: &Item) -> JsonValue {
    JsonValue::Object(
        item.iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

fn json_fields(fields: &JsonMap<String, JsonValue>) -> Result<Item, CodecError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), AttributeValue::try_from_json(value)?)))
        .collect()
}

fn json_strings(items: &[JsonValue]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(ToString::to_string))
        .collect()
}

fn decode_base64(text: &str) -> Result<Vec<u8>, CodecError> {
    BASE64
        .decode(text)
        .map_err(|err| CodecError::InvalidBinary {
            reason: err.to_string(),
        })
}
