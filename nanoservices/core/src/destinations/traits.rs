use async_trait::async_trait;
use serde_json::Value;
use wpsf_utils::{CleanedRecord, TapResult};

/// Receives schema and record messages, in the order they are produced.
///
/// A stream's schema is written once, before any of its records.
#[async_trait]
pub trait Sink: Send {
    fn name(&self) -> &str;

    async fn write_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
    ) -> TapResult<()>;

    async fn write_record(&mut self, stream: &str, record: &CleanedRecord) -> TapResult<()>;

    async fn flush(&mut self) -> TapResult<()> {
        Ok(())
    }
}
