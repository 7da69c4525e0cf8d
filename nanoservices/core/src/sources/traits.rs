use async_trait::async_trait;
use url::Url;
use wpsf_utils::TapResult;

/// Retrieves a feed document body.
///
/// Implementations return the full body in one call; a non-2xx response is
/// an error, never an empty body.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    async fn get(&self, url: &Url) -> TapResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTransport;

    #[async_trait]
    impl FeedTransport for EchoTransport {
        fn name(&self) -> &str { "echo" }
        async fn get(&self, url: &Url) -> TapResult<Vec<u8>> {
            Ok(url.as_str().as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn transport_trait_works() {
        let transport = EchoTransport;
        assert_eq!(transport.name(), "echo");
        let url = Url::parse("https://wordpress.org/support/plugin/a/feed").unwrap();
        let body = transport.get(&url).await.unwrap();
        assert_eq!(body, url.as_str().as_bytes());
    }
}
