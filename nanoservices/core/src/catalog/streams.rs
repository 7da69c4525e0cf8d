use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wpsf_utils::error::Error;
use wpsf_utils::TapResult;

use crate::transforms::mapping::{Converter, FieldMapping, MappingEntry};

/// The closed set of streams this tap knows how to extract and clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    SupportRequests,
}

impl StreamKind {
    pub const ALL: [StreamKind; 1] = [StreamKind::SupportRequests];

    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::SupportRequests => "support_requests",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownStream(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    FullTable,
}

impl ReplicationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationMethod::FullTable => "FULL_TABLE",
        }
    }
}

/// Build-time description of one stream.
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    pub kind: StreamKind,
    pub key_properties: Vec<String>,
    pub schema: Value,
    pub replication_method: ReplicationMethod,
    pub mapping: FieldMapping,
}

impl StreamDefinition {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Constructed registry of stream definitions, validated once on creation.
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    /// Each definition's mapping must only target properties its schema declares.
    pub fn new(streams: Vec<StreamDefinition>) -> TapResult<Self> {
        for stream in &streams {
            stream.mapping.validate(&stream.schema)?;
        }
        Ok(Self { streams })
    }

    /// The streams shipped with the tap.
    pub fn builtin() -> TapResult<Self> {
        Self::new(vec![support_requests()])
    }

    pub fn get(&self, name: &str) -> TapResult<&StreamDefinition> {
        let kind = StreamKind::from_str(name)?;
        self.streams
            .iter()
            .find(|s| s.kind == kind)
            .ok_or_else(|| Error::UnknownStream(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }
}

fn support_requests() -> StreamDefinition {
    let kind = StreamKind::SupportRequests;
    StreamDefinition {
        kind,
        key_properties: vec!["id".to_string()],
        schema: json!({
            "type": ["null", "object"],
            "additionalProperties": false,
            "properties": {
                "id": {"type": ["string"]},
                "plugin": {"type": ["null", "string"]},
                "title": {"type": ["null", "string"]},
                "published": {"type": ["null", "string"], "format": "date-time"},
                "authors": {"type": ["null", "string"]},
                "description": {"type": ["null", "string"]}
            }
        }),
        replication_method: ReplicationMethod::FullTable,
        mapping: FieldMapping::new(
            kind.name(),
            vec![
                MappingEntry::new("id").converter(Converter::Text).not_null(),
                MappingEntry::new("plugin").converter(Converter::Text),
                MappingEntry::new("title").converter(Converter::Text),
                MappingEntry::new("published").converter(Converter::DateTime),
                MappingEntry::new("authors").converter(Converter::Text),
                MappingEntry::new("description").converter(Converter::Text),
            ],
        ),
    }
}
