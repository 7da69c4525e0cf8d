//! wpsf_core — extraction pipeline for WordPress.org plugin support forums
//!
//! This crate fetches each configured plugin's support feed, cleans every
//! entry into a flat record and writes schema and record messages to a sink,
//! driven by a stream catalog.
//!
//! Basic usage:
//!
//! ```no_run
//! use wpsf_core::catalog::{discover, streams::StreamRegistry};
//! use wpsf_core::destinations::JsonLinesSink;
//! use wpsf_core::sources::{http_client::HttpTransportBuilder, FeedFetcher};
//! use wpsf_core::sync::SyncEngine;
//!
//! # async fn run() -> wpsf_utils::TapResult<()> {
//! let registry = StreamRegistry::builtin()?;
//! let catalog = discover(&registry);
//! let transport = HttpTransportBuilder::default().build()?;
//! let fetcher = FeedFetcher::new(transport, vec!["akismet".to_string()]);
//! let mut engine = SyncEngine::new(&registry, fetcher, JsonLinesSink::stdout());
//! engine.run(&catalog).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod destinations;
pub mod sources;
pub mod sync;
pub mod transforms;

pub mod logging;

pub mod metrics;
