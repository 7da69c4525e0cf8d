pub use wpsf_core as core;
pub use wpsf_utils as utils;

pub mod cli;

// Convenience re-exports for common usage
pub use wpsf_core::catalog::{discover, streams::StreamRegistry, Catalog};
pub use wpsf_core::destinations::{JsonLinesSink, Sink};
pub use wpsf_core::sources::{FeedFetcher, FeedTransport};
pub use wpsf_core::sync::SyncEngine;
pub use wpsf_utils::{CleanedRecord, RawRecord, TapResult};
