use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;
use wpsf_utils::error::Error;
use wpsf_utils::TapResult;

use super::traits::FeedTransport;

/// In-memory transport serving canned feed bodies by URL.
///
/// Unknown URLs answer like a 404. Every request is logged so callers can
/// check fetch order.
#[derive(Debug, Default)]
pub struct FixtureTransport {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeedTransport for FixtureTransport {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn get(&self, url: &Url) -> TapResult<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::UpstreamStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_url_answers_not_found_and_is_recorded() {
        let transport = FixtureTransport::new().with_body("https://example.org/a", "body");
        let known = Url::parse("https://example.org/a").unwrap();
        let unknown = Url::parse("https://example.org/b").unwrap();

        assert_eq!(transport.get(&known).await.unwrap(), b"body".to_vec());
        let err = transport.get(&unknown).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus { status: 404, .. }));
        assert_eq!(
            transport.requests(),
            vec!["https://example.org/a", "https://example.org/b"]
        );
    }
}
