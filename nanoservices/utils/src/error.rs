use thiserror::Error;
use reqwest::Error as ReqwestError;
use serde_json::Value;
use tokio::io::Error as TokioIoError;
use url::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest Error: {0}")]
    RestSourceError(#[from] ReqwestError),

    #[error("Tokio Error: {0}")]
    TokioError(#[from] TokioIoError),

    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Url Error: {0}")]
    UrlParseError(#[from] ParseError),

    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("failed to parse feed from {url}: {reason}")]
    FeedParse { url: String, reason: String },

    #[error("malformed feed from {url}: {reason}")]
    MalformedFeed { url: String, reason: String },

    /// A declared converter rejected the observed value.
    #[error("could not convert {value} to {target}: {reason}")]
    Conversion {
        value: Value,
        target: &'static str,
        reason: String,
    },

    #[error("record for stream '{stream}' has no field '{field}'")]
    MissingField { stream: String, field: String },

    #[error("unknown stream '{0}'")]
    UnknownStream(String),

    #[error("mapping for stream '{stream}' targets '{field}', which its schema does not declare")]
    SchemaMismatch { stream: String, field: String },

    #[error("missing required config key '{0}'")]
    MissingConfigKey(String),

    #[error("configuration error: {0}")]
    Config(String),
}
