pub mod feed;
#[cfg(any(test, feature = "test-util"))]
pub mod fixture;
pub mod http_client;
pub mod traits;

pub use feed::FeedFetcher;
pub use traits::FeedTransport;
