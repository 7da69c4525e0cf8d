use futures_util::stream::{self, StreamExt, TryStreamExt};
use rss::{Channel, Item};
use serde_json::Value;
use url::Url;
use wpsf_utils::error::Error;
use wpsf_utils::{RawRecord, RecordStream, TapResult};

use super::traits::FeedTransport;

pub const API_SCHEME: &str = "https://";
pub const API_BASE_URL: &str = "wordpress.org";
pub const PATH_PLUGIN: &str = "/support/plugin/:plugin:/feed";

/// Request path for a plugin's support feed.
pub fn plugin_path(plugin: &str) -> String {
    PATH_PLUGIN.replace(":plugin:", plugin)
}

pub fn plugin_url(plugin: &str) -> TapResult<Url> {
    Ok(Url::parse(&format!("{API_SCHEME}{API_BASE_URL}{}", plugin_path(plugin)))?)
}

/// Pulls support-request feeds for a fixed list of plugins.
pub struct FeedFetcher<T> {
    transport: T,
    plugins: Vec<String>,
}

impl<T: FeedTransport> FeedFetcher<T> {
    pub fn new(transport: T, plugins: Vec<String>) -> Self {
        Self { transport, plugins }
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Raw support-request records, plugin by plugin in configured order.
    ///
    /// A plugin's feed is only requested once every record of the previous
    /// plugin has been pulled. The first failure ends the stream.
    pub fn support_requests(&self) -> RecordStream<'_> {
        let records = stream::iter(self.plugins.iter())
            .then(move |plugin| self.fetch_plugin(plugin))
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, Error>)))
            .try_flatten();
        Box::pin(records)
    }

    async fn fetch_plugin(&self, plugin: &str) -> TapResult<Vec<RawRecord>> {
        let path = plugin_path(plugin);
        let url = plugin_url(plugin)?;

        tracing::info!(transport = self.transport.name(), "Loading: {url}");
        let body = self.transport.get(&url).await?;
        crate::metrics::inc_resource(plugin);

        let channel = Channel::read_from(&body[..]).map_err(|e| Error::FeedParse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let records = channel
            .items()
            .iter()
            .map(|item| {
                entry_record(item, &path).ok_or_else(|| Error::MalformedFeed {
                    url: url.to_string(),
                    reason: "entry has neither guid nor link".to_string(),
                })
            })
            .collect::<TapResult<Vec<_>>>()?;

        tracing::debug!(plugin, entries = records.len(), "feed parsed");
        Ok(records)
    }
}

/// Project one feed entry into a raw record; `None` when it has no identifier.
fn entry_record(item: &Item, path: &str) -> Option<RawRecord> {
    let id = item.guid().map(|g| g.value()).or_else(|| item.link())?;
    let authors = item
        .author()
        .map(str::to_string)
        .or_else(|| {
            item.dublin_core_ext()
                .map(|dc| dc.creators().join(", "))
        })
        .unwrap_or_default();

    let mut record = RawRecord::new();
    record.insert("id".into(), Value::from(id));
    record.insert("plugin".into(), Value::from(path));
    record.insert("title".into(), Value::from(item.title().unwrap_or_default()));
    record.insert("published".into(), Value::from(item.pub_date().unwrap_or_default()));
    record.insert("authors".into(), Value::from(authors));
    record.insert(
        "description".into(),
        Value::from(item.description().unwrap_or_default()),
    );
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fixture::FixtureTransport;

    const TWO_ENTRIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>my-plugin support</title>
    <link>https://wordpress.org/support/plugin/my-plugin/</link>
    <description>Support requests</description>
    <item>
      <title>First</title>
      <guid isPermaLink="true">https://wordpress.org/support/topic/first/</guid>
      <pubDate>Mon, 01 Jan 2024 10:00:00 +0000</pubDate>
      <dc:creator>alice</dc:creator>
      <description><![CDATA[<p>one</p>]]></description>
    </item>
    <item>
      <title>Second</title>
      <link>https://wordpress.org/support/topic/second/</link>
      <description>two</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn builds_plugin_url_from_template() {
        assert_eq!(plugin_path("my-plugin"), "/support/plugin/my-plugin/feed");
        assert_eq!(
            plugin_url("my-plugin").unwrap().as_str(),
            "https://wordpress.org/support/plugin/my-plugin/feed"
        );
    }

    #[tokio::test]
    async fn projects_entries_into_raw_records() {
        let transport = FixtureTransport::new().with_body(
            "https://wordpress.org/support/plugin/my-plugin/feed",
            TWO_ENTRIES,
        );
        let fetcher = FeedFetcher::new(transport, vec!["my-plugin".to_string()]);
        let records: Vec<RawRecord> = fetcher.support_requests().try_collect().await.unwrap();

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first["id"], "https://wordpress.org/support/topic/first/");
        assert_eq!(first["plugin"], "/support/plugin/my-plugin/feed");
        assert_eq!(first["title"], "First");
        assert_eq!(first["published"], "Mon, 01 Jan 2024 10:00:00 +0000");
        assert_eq!(first["authors"], "alice");
        assert_eq!(first["description"], "<p>one</p>");

        let second = &records[1];
        assert_eq!(second["id"], "https://wordpress.org/support/topic/second/");
        assert_eq!(second["published"], "");
        assert_eq!(second["authors"], "");
    }

    #[tokio::test]
    async fn next_plugin_is_fetched_lazily() {
        let transport = FixtureTransport::new()
            .with_body("https://wordpress.org/support/plugin/a/feed", TWO_ENTRIES)
            .with_body("https://wordpress.org/support/plugin/b/feed", TWO_ENTRIES);
        let fetcher = FeedFetcher::new(transport, vec!["a".to_string(), "b".to_string()]);
        let mut records = fetcher.support_requests();

        records.next().await.unwrap().unwrap();
        records.next().await.unwrap().unwrap();
        assert_eq!(
            fetcher.transport().requests(),
            vec!["https://wordpress.org/support/plugin/a/feed"]
        );

        records.next().await.unwrap().unwrap();
        assert_eq!(fetcher.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn failed_plugin_aborts_remaining_plugins() {
        let transport = FixtureTransport::new()
            .with_body("https://wordpress.org/support/plugin/b/feed", TWO_ENTRIES);
        let fetcher = FeedFetcher::new(transport, vec!["a".to_string(), "b".to_string()]);
        let result: TapResult<Vec<RawRecord>> = fetcher.support_requests().try_collect().await;

        assert!(matches!(result, Err(Error::UpstreamStatus { status: 404, .. })));
        assert_eq!(fetcher.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn unparsable_body_is_a_feed_error() {
        let transport = FixtureTransport::new()
            .with_body("https://wordpress.org/support/plugin/a/feed", "not a feed");
        let fetcher = FeedFetcher::new(transport, vec!["a".to_string()]);
        let result: TapResult<Vec<RawRecord>> = fetcher.support_requests().try_collect().await;
        assert!(matches!(result, Err(Error::FeedParse { .. })));
    }
}
