use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of the static address list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    /// Only string values are kept; any other JSON value reads as absent.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AddressRecord {
    pub fn new(address: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            kind: Some(kind.into()),
            name: None,
            phone: None,
            email: None,
        }
    }

    pub fn layer(&self) -> LayerKind {
        LayerKind::from_type(self.kind.as_deref())
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(kind)) => Some(kind),
        _ => None,
    })
}

/// The three layers a record can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Red,
    Blue,
    Other,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Red, LayerKind::Blue, LayerKind::Other];

    /// Maps a record's `type` field to its layer. Matching is exact and
    /// case-sensitive; anything unrecognised, including a missing field, is `Other`.
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("red") => LayerKind::Red,
            Some("blue") => LayerKind::Blue,
            _ => LayerKind::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LayerKind::Red => "red",
            LayerKind::Blue => "blue",
            LayerKind::Other => "other",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LayerKind::Red => "Red Layer",
            LayerKind::Blue => "Blue Layer",
            LayerKind::Other => "Green Layer",
        }
    }

    /// Marker color used by renderers for this layer.
    pub fn marker_color(&self) -> &'static str {
        match self {
            LayerKind::Red => "red",
            LayerKind::Blue => "blue",
            LayerKind::Other => "teal",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
