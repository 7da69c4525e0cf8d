use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use wpsf_utils::error::Error;
use wpsf_utils::{CleanedRecord, RawRecord, TapResult};

use crate::catalog::streams::{StreamDefinition, StreamKind, StreamRegistry};

pub const TOPIC_URL_PREFIX: &str = "https://wordpress.org/support/topic/";
pub const PLUGIN_PATH_PREFIX: &str = "/support/plugin/";
pub const PLUGIN_PATH_SUFFIX: &str = "/feed";

// Tags (which may span lines), then named/decimal/hex character entities.
static HTML_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<.*?>|&([a-z0-9]+|#[0-9]{1,6}|#x[0-9a-f]{1,6});").expect("valid html pattern")
});

/// Remove HTML tags and character entities.
///
/// Repeats until nothing matches, so nested entities such as `&amp;amp;`
/// leave no residue.
pub fn strip_html(text: &str) -> String {
    let mut stripped = HTML_PATTERN.replace_all(text, "").into_owned();
    while HTML_PATTERN.is_match(&stripped) {
        stripped = HTML_PATTERN.replace_all(&stripped, "").into_owned();
    }
    stripped
}

/// Strip HTML, turn newlines into spaces and drop tabs.
///
/// Runs to a fixed point: dropping a tab can join an entity back together
/// (`&am\tp;`), which then has to be stripped too.
pub fn scrub_description(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_html(&current).replace('\n', " ").replace('\t', "");
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Dispatches raw records to the cleaner of their stream.
pub struct RecordCleaner<'a> {
    registry: &'a StreamRegistry,
}

impl<'a> RecordCleaner<'a> {
    pub fn new(registry: &'a StreamRegistry) -> Self {
        Self { registry }
    }

    /// Clean `raw` for the stream called `stream`; unknown names are an error.
    pub fn clean(&self, raw: RawRecord, stream: &str) -> TapResult<CleanedRecord> {
        clean_record(raw, self.registry.get(stream)?)
    }
}

/// Clean `raw` with the cleaner of `definition`'s stream kind.
pub fn clean_record(raw: RawRecord, definition: &StreamDefinition) -> TapResult<CleanedRecord> {
    match definition.kind {
        StreamKind::SupportRequests => clean_support_requests(raw, definition),
    }
}

/// Support-request cleaning. URL stripping runs before HTML stripping, which
/// runs before whitespace collapsing.
fn clean_support_requests(
    mut row: RawRecord,
    definition: &StreamDefinition,
) -> TapResult<CleanedRecord> {
    let stream = definition.name();

    let id = text_field(&row, stream, "id")?
        .replace(TOPIC_URL_PREFIX, "")
        .replace('/', "");
    row.insert("id".into(), Value::String(id));

    let plugin = text_field(&row, stream, "plugin")?
        .replace(PLUGIN_PATH_PREFIX, "")
        .replace(PLUGIN_PATH_SUFFIX, "");
    row.insert("plugin".into(), Value::String(plugin));

    let description = scrub_description(text_field(&row, stream, "description")?);
    let title = strip_html(text_field(&row, stream, "title")?);
    row.insert("description".into(), Value::String(description));
    row.insert("title".into(), Value::String(title));

    definition.mapping.coerce(&row)
}

fn text_field<'r>(row: &'r RawRecord, stream: &str, field: &str) -> TapResult<&'r str> {
    match row.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::Conversion {
            value: other.clone(),
            target: "string",
            reason: format!("field '{field}' must be text before cleaning"),
        }),
        None => Err(Error::MissingField {
            stream: stream.to_string(),
            field: field.to_string(),
        }),
    }
}
