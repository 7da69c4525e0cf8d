pub mod engine;

pub use engine::{StreamSummary, SyncEngine, SyncState};
