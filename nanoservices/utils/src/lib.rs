pub mod error;

use error::Error;
use futures_util::Stream;
use serde_json::{Map, Value};
use std::pin::Pin;

pub type TapResult<T> = Result<T, Error>;

/// Feed entry fields exactly as they were read, before any cleaning.
pub type RawRecord = Map<String, Value>;

/// A record keyed by its stream's mapping targets, ready for the sink.
pub type CleanedRecord = Map<String, Value>;

/// Lazily produced raw records; the first `Err` ends the extraction.
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = TapResult<RawRecord>> + Send + 'a>>;
