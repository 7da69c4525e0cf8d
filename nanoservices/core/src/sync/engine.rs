use std::time::Instant;

use futures_util::TryStreamExt;
use serde_json::Value;
use wpsf_utils::{CleanedRecord, RecordStream, TapResult};

use crate::catalog::streams::{StreamDefinition, StreamKind, StreamRegistry};
use crate::catalog::{Catalog, CatalogEntry};
use crate::destinations::traits::Sink;
use crate::sources::feed::FeedFetcher;
use crate::sources::traits::FeedTransport;
use crate::transforms::cleaners::clean_record;

/// Where a sync currently stands. Moves forward only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Init,
    Extract { stream: String },
    Done,
}

/// Per-stream outcome of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub stream: String,
    pub records: usize,
}

/// A selected catalog entry resolved against the registry.
struct PlannedStream<'c, 'r> {
    entry: &'c CatalogEntry,
    definition: &'r StreamDefinition,
}

/// Runs one full-table sync: every selected stream, every configured plugin.
pub struct SyncEngine<'r, T, S> {
    registry: &'r StreamRegistry,
    fetcher: FeedFetcher<T>,
    sink: S,
    state: SyncState,
}

impl<'r, T: FeedTransport, S: Sink> SyncEngine<'r, T, S> {
    pub fn new(registry: &'r StreamRegistry, fetcher: FeedFetcher<T>, sink: S) -> Self {
        Self {
            registry,
            fetcher,
            sink,
            state: SyncState::Init,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn fetcher(&self) -> &FeedFetcher<T> {
        &self.fetcher
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Sync every selected stream of `catalog`, in catalog order.
    ///
    /// Every selected stream is resolved before anything is written, so an
    /// unknown stream fails the run with an empty sink. Any later error
    /// ends the run where it happened.
    pub async fn run(&mut self, catalog: &Catalog) -> TapResult<Vec<StreamSummary>> {
        let plan = self.plan(catalog)?;
        tracing::info!(
            streams = plan.len(),
            plugins = self.fetcher.plugins().len(),
            "starting sync"
        );

        let mut summaries = Vec::with_capacity(plan.len());
        for planned in plan {
            self.state = SyncState::Extract {
                stream: planned.entry.tap_stream_id.clone(),
            };
            summaries.push(self.sync_stream(&planned).await?);
        }

        self.sink.flush().await?;
        self.state = SyncState::Done;
        Ok(summaries)
    }

    fn plan<'c>(&self, catalog: &'c Catalog) -> TapResult<Vec<PlannedStream<'c, 'r>>> {
        let registry = self.registry;
        catalog
            .selected_streams()
            .map(|entry| {
                let definition = registry.get(&entry.tap_stream_id)?;
                Ok(PlannedStream { entry, definition })
            })
            .collect()
    }

    async fn sync_stream(&mut self, planned: &PlannedStream<'_, 'r>) -> TapResult<StreamSummary> {
        let stream = planned.entry.tap_stream_id.as_str();
        let definition = planned.definition;
        let started = Instant::now();

        let schema = effective_schema(planned.entry, definition);
        let key_properties = if planned.entry.key_properties.is_empty() {
            &definition.key_properties
        } else {
            &planned.entry.key_properties
        };

        for field in missing_key_properties(schema, key_properties) {
            tracing::warn!(
                stream,
                field,
                "key property not declared in catalog schema; it will be dropped"
            );
        }

        tracing::info!(stream, "syncing stream");
        self.sink.write_schema(stream, schema, key_properties).await?;

        let mut raw_records = records_for(&self.fetcher, definition.kind);
        let mut count = 0usize;
        while let Some(raw) = raw_records.try_next().await? {
            let cleaned = conform_to_schema(clean_record(raw, definition)?, schema);
            self.sink.write_record(stream, &cleaned).await?;
            crate::metrics::inc_record(stream);
            count += 1;
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        crate::metrics::observe_duration(stream, elapsed_ms);
        tracing::info!(stream, records = count, elapsed_ms, "stream synced");

        Ok(StreamSummary {
            stream: stream.to_string(),
            records: count,
        })
    }
}

fn records_for<T: FeedTransport>(fetcher: &FeedFetcher<T>, kind: StreamKind) -> RecordStream<'_> {
    match kind {
        StreamKind::SupportRequests => fetcher.support_requests(),
    }
}

/// The operator's schema when the catalog carries one, else the registry's.
fn effective_schema<'a>(entry: &'a CatalogEntry, definition: &'a StreamDefinition) -> &'a Value {
    match entry.schema.as_object() {
        Some(schema) if !schema.is_empty() => &entry.schema,
        _ => &definition.schema,
    }
}

/// Keep only the fields `schema` declares, in record order.
///
/// A schema without `properties` accepts every field.
pub fn conform_to_schema(record: CleanedRecord, schema: &Value) -> CleanedRecord {
    match schema.get("properties").and_then(Value::as_object) {
        Some(properties) => record
            .into_iter()
            .filter(|(key, _)| properties.contains_key(key))
            .collect(),
        None => record,
    }
}

/// Key properties that `schema` would filter out of every record.
///
/// Empty when the schema has no `properties`, since then nothing is dropped.
pub fn missing_key_properties<'k>(schema: &Value, key_properties: &'k [String]) -> Vec<&'k str> {
    match schema.get("properties").and_then(Value::as_object) {
        Some(properties) => key_properties
            .iter()
            .filter(|key| !properties.contains_key(key.as_str()))
            .map(String::as_str)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conform_drops_undeclared_fields() {
        let record: CleanedRecord = json!({"id": "1", "title": "t", "extra": 1})
            .as_object()
            .cloned()
            .unwrap();
        let schema = json!({"properties": {"title": {}, "id": {}}});
        let conformed = conform_to_schema(record.clone(), &schema);
        let keys: Vec<&str> = conformed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "title"]);

        assert_eq!(conform_to_schema(record.clone(), &json!({})), record);
    }

    #[test]
    fn reports_key_properties_the_schema_would_drop() {
        let keys = vec!["id".to_string(), "plugin".to_string()];
        let schema = json!({"properties": {"title": {}, "plugin": {}}});
        assert_eq!(missing_key_properties(&schema, &keys), vec!["id"]);

        let full = json!({"properties": {"id": {}, "plugin": {}}});
        assert!(missing_key_properties(&full, &keys).is_empty());
        assert!(missing_key_properties(&json!({}), &keys).is_empty());
    }

    #[test]
    fn operator_schema_overrides_registry_schema() {
        let registry = StreamRegistry::builtin().unwrap();
        let definition = registry.get("support_requests").unwrap();
        let mut entry = CatalogEntry {
            tap_stream_id: "support_requests".into(),
            stream: "support_requests".into(),
            key_properties: vec![],
            schema: json!({}),
            metadata: vec![],
        };
        assert_eq!(effective_schema(&entry, definition), &definition.schema);

        entry.schema = json!({"properties": {"id": {"type": "string"}}});
        assert_eq!(effective_schema(&entry, definition), &entry.schema);
    }
}
