//! Append-only point layers and their GeoJSON view.

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::sync::watch;
use tracing::trace;

use crate::geocoder::OUTPUT_WKID;
use crate::records::LayerKind;

pub const OBJECT_ID_FIELD: &str = "ObjectID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Oid,
    String,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub alias: &'static str,
    pub field_type: FieldType,
}

/// Attribute schema shared by every layer.
pub static LAYER_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec {
            name: OBJECT_ID_FIELD,
            alias: "ObjectID",
            field_type: FieldType::Oid,
        },
        FieldSpec {
            name: "name",
            alias: "Name",
            field_type: FieldType::String,
        },
        FieldSpec {
            name: "address",
            alias: "Address",
            field_type: FieldType::String,
        },
        FieldSpec {
            name: "phone",
            alias: "Phone",
            field_type: FieldType::String,
        },
        FieldSpec {
            name: "email",
            alias: "Email",
            field_type: FieldType::String,
        },
        FieldSpec {
            name: "type",
            alias: "type",
            field_type: FieldType::String,
        },
    ]
});

#[derive(Debug, Clone, PartialEq)]
pub struct PointAttributes {
    pub address: String,
}

/// A geocoded point ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub x: f64,
    pub y: f64,
    pub attributes: PointAttributes,
}

impl PointFeature {
    pub fn new(x: f64, y: f64, address: impl Into<String>) -> Self {
        Self {
            x,
            y,
            attributes: PointAttributes {
                address: address.into(),
            },
        }
    }
}

/// A feature as stored by a layer, tagged with the object id it was assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeature {
    pub object_id: u64,
    pub feature: PointFeature,
}

/// Destination for placed points.
pub trait LayerSink {
    fn insert(&mut self, feature: PointFeature);
}

#[derive(Debug)]
pub struct FeatureLayer {
    kind: LayerKind,
    features: Vec<StoredFeature>,
    next_object_id: u64,
    redraw: watch::Sender<usize>,
}

impl FeatureLayer {
    pub fn new(kind: LayerKind) -> Self {
        let (redraw, _) = watch::channel(0);
        Self {
            kind,
            features: Vec::new(),
            next_object_id: 1,
            redraw,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn wkid(&self) -> u32 {
        OUTPUT_WKID
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        &LAYER_FIELDS
    }

    pub fn features(&self) -> &[StoredFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Watches the feature count; a renderer redraws whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.redraw.subscribe()
    }

    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|stored| {
                let mut properties = JsonObject::new();
                properties.insert(OBJECT_ID_FIELD.to_string(), Value::from(stored.object_id));
                properties.insert(
                    "address".to_string(),
                    Value::String(stored.feature.attributes.address.clone()),
                );
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(GeoValue::Point(vec![
                        stored.feature.x,
                        stored.feature.y,
                    ]))),
                    id: Some(Id::Number(stored.object_id.into())),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("title".to_string(), Value::from(self.title()));
        foreign_members.insert("wkid".to_string(), Value::from(self.wkid()));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }
}

impl LayerSink for FeatureLayer {
    fn insert(&mut self, feature: PointFeature) {
        let object_id = self.next_object_id;
        self.next_object_id += 1;
        self.features.push(StoredFeature { object_id, feature });
        self.redraw.send_replace(self.features.len());
        trace!(layer = %self.kind, object_id, "feature inserted");
    }
}

/// The three layers, created empty at startup.
#[derive(Debug)]
pub struct LayerSet {
    red: FeatureLayer,
    blue: FeatureLayer,
    other: FeatureLayer,
}

impl Default for LayerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSet {
    pub fn new() -> Self {
        Self {
            red: FeatureLayer::new(LayerKind::Red),
            blue: FeatureLayer::new(LayerKind::Blue),
            other: FeatureLayer::new(LayerKind::Other),
        }
    }

    pub fn layer(&self, kind: LayerKind) -> &FeatureLayer {
        match kind {
            LayerKind::Red => &self.red,
            LayerKind::Blue => &self.blue,
            LayerKind::Other => &self.other,
        }
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut FeatureLayer {
        match kind {
            LayerKind::Red => &mut self.red,
            LayerKind::Blue => &mut self.blue,
            LayerKind::Other => &mut self.other,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureLayer> {
        [&self.red, &self.blue, &self.other].into_iter()
    }

    pub fn total(&self) -> usize {
        self.iter().map(FeatureLayer::len).sum()
    }
}
