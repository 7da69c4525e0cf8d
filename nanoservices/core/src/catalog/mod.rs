//! Stream catalog: the discovery document and the selection state a sync
//! runs against.

pub mod streams;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use wpsf_utils::TapResult;

use streams::StreamRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    #[serde(default)]
    pub key_properties: Vec<String>,
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl CatalogEntry {
    /// Metadata attached to the stream itself (empty breadcrumb).
    pub fn stream_metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    /// Selected through stream metadata, or the legacy `selected` schema flag.
    pub fn is_selected(&self) -> bool {
        let by_metadata = self
            .stream_metadata()
            .and_then(|m| m.get("selected"))
            .and_then(Value::as_bool);
        let by_schema = self.schema.get("selected").and_then(Value::as_bool);
        by_metadata.or(by_schema).unwrap_or(false)
    }
}

impl Catalog {
    pub fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|s| s.is_selected())
    }

    pub fn from_json(json: &str) -> TapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> TapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the catalog for every registered stream, all selected.
///
/// Pure function of the registry: two calls over the same registry produce
/// identical documents.
pub fn discover(registry: &StreamRegistry) -> Catalog {
    let streams = registry
        .iter()
        .map(|def| {
            let mut metadata = vec![MetadataEntry {
                breadcrumb: Vec::new(),
                metadata: object(json!({
                    "selected": true,
                    "inclusion": "available",
                    "table-key-properties": def.key_properties,
                    "forced-replication-method": def.replication_method.as_str(),
                })),
            }];
            if let Some(properties) = def.schema.get("properties").and_then(Value::as_object) {
                for field in properties.keys() {
                    let inclusion = if def.key_properties.contains(field) {
                        "automatic"
                    } else {
                        "available"
                    };
                    metadata.push(MetadataEntry {
                        breadcrumb: vec!["properties".to_string(), field.clone()],
                        metadata: object(json!({ "inclusion": inclusion })),
                    });
                }
            }
            CatalogEntry {
                tap_stream_id: def.name().to_string(),
                stream: def.name().to_string(),
                key_properties: def.key_properties.clone(),
                schema: def.schema.clone(),
                metadata,
            }
        })
        .collect();
    Catalog { streams }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
