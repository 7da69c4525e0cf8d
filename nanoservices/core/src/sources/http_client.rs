use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use url::Url;
use wpsf_utils::error::Error;
use wpsf_utils::TapResult;

use super::traits::FeedTransport;

const DEFAULT_USER_AGENT: &str = concat!("wpsf-tap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HttpTransportBuilder {
    user_agent: String,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpTransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent<T: Into<String>>(mut self, user_agent: T) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> TapResult<HttpTransport> {
        let client = ReqwestClient::builder()
            .user_agent(self.user_agent)
            .build()?;

        Ok(HttpTransport { client })
    }
}

/// Feed transport issuing plain GETs through `reqwest` with its default timeouts.
pub struct HttpTransport {
    client: ReqwestClient,
}

#[async_trait]
impl FeedTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, url: &Url) -> TapResult<Vec<u8>> {
        let resp = self.client.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
