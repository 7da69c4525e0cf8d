use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use wpsf_core::catalog::{discover, streams::StreamRegistry, Catalog};
use wpsf_core::config::{load_catalog, load_config};
use wpsf_core::destinations::JsonLinesSink;
use wpsf_core::sources::{http_client::HttpTransportBuilder, FeedFetcher};
use wpsf_core::sync::SyncEngine;
use wpsf_utils::TapResult;

#[derive(Debug, Parser)]
#[command(
    name = "wpsf-tap",
    version,
    about = "Extract WordPress.org plugin support requests as Singer messages"
)]
pub struct Cli {
    /// Path to the JSON (or YAML) config; requires `plugins`.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Catalog selecting the streams to sync. Defaults to a fresh discovery.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Accepted for runner compatibility; every run is a full-table extraction.
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Print the catalog instead of syncing.
    #[arg(short, long)]
    pub discover: bool,
}

/// Run the tap for parsed arguments, writing messages to stdout.
pub async fn run(cli: Cli) -> TapResult<()> {
    tracing::info!(">>> Running wpsf-tap v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.config)?;
    let registry = StreamRegistry::builtin()?;

    if cli.discover {
        return dump_catalog(&discover(&registry), &mut tokio::io::stdout()).await;
    }

    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => discover(&registry),
    };
    if let Some(state) = &cli.state {
        tracing::info!(path = %state.display(), "ignoring state; full-table extraction");
    }

    let transport = HttpTransportBuilder::default().build()?;
    let fetcher = FeedFetcher::new(transport, config.plugins());
    let mut engine = SyncEngine::new(&registry, fetcher, JsonLinesSink::stdout());
    let summaries = engine.run(&catalog).await?;

    let total: usize = summaries.iter().map(|s| s.records).sum();
    tracing::info!(streams = summaries.len(), records = total, "sync complete");
    tracing::debug!(metrics = %wpsf_core::metrics::gather_text(), "run metrics");
    Ok(())
}

/// Write the catalog as pretty JSON followed by a newline.
pub async fn dump_catalog<W: AsyncWrite + Unpin>(catalog: &Catalog, out: &mut W) -> TapResult<()> {
    out.write_all(catalog.to_json_pretty()?.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_arguments() {
        let cli = Cli::try_parse_from([
            "wpsf-tap", "--config", "config.json", "--catalog", "catalog.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.catalog, Some(PathBuf::from("catalog.json")));
        assert!(!cli.discover);
    }

    #[test]
    fn parses_discover_flag() {
        let cli = Cli::try_parse_from(["wpsf-tap", "-c", "config.json", "--discover"]).unwrap();
        assert!(cli.discover);
        assert!(cli.catalog.is_none());
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["wpsf-tap", "--discover"]).is_err());
    }

    #[tokio::test]
    async fn dumped_catalog_parses_back() {
        let registry = StreamRegistry::builtin().unwrap();
        let catalog = discover(&registry);
        let mut out = Vec::new();
        dump_catalog(&catalog, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(Catalog::from_json(&text).unwrap(), catalog);
    }
}
