use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use wpsf_utils::{CleanedRecord, TapResult};

use super::traits::Sink;

/// One line of Singer output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: &'a Value,
        key_properties: &'a [String],
    },
    Record {
        stream: &'a str,
        record: &'a CleanedRecord,
        time_extracted: String,
    },
}

/// Writes one JSON message per line to an async writer.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn write_message(&mut self, message: &Message<'_>) -> TapResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Sink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn write_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
    ) -> TapResult<()> {
        self.write_message(&Message::Schema { stream, schema, key_properties })
            .await
    }

    async fn write_record(&mut self, stream: &str, record: &CleanedRecord) -> TapResult<()> {
        let time_extracted = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.write_message(&Message::Record { stream, record, time_extracted })
            .await
    }

    async fn flush(&mut self) -> TapResult<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_singer_messages_one_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let schema = json!({"type": "object", "properties": {"id": {"type": "string"}}});
        sink.write_schema("support_requests", &schema, &["id".to_string()])
            .await
            .unwrap();
        let record = json!({"id": "42"}).as_object().cloned().unwrap();
        sink.write_record("support_requests", &record).await.unwrap();
        sink.flush().await.unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "SCHEMA");
        assert_eq!(lines[0]["stream"], "support_requests");
        assert_eq!(lines[0]["key_properties"], json!(["id"]));
        assert_eq!(lines[0]["schema"], schema);
        assert_eq!(lines[1]["type"], "RECORD");
        assert_eq!(lines[1]["record"], json!({"id": "42"}));
        assert!(lines[1]["time_extracted"].as_str().unwrap().ends_with('Z'));
    }
}
