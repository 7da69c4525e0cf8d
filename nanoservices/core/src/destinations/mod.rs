pub mod jsonl;
pub mod traits;

pub use jsonl::JsonLinesSink;
pub use traits::Sink;
