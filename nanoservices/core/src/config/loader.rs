use std::path::Path;

use serde_json::Value;
use wpsf_utils::error::Error;

use crate::catalog::Catalog;
use crate::config::types::TapConfig;

pub const REQUIRED_CONFIG_KEYS: &[&str] = &["plugins"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config must be an object")]
    NotAnObject,
    #[error("missing required config key '{0}'")]
    MissingKey(String),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingKey(key) => Error::MissingConfigKey(key),
            other => Error::Config(other.to_string()),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load the tap config; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
pub fn load_config(path: impl AsRef<Path>) -> Result<TapConfig, ConfigError> {
    let path = path.as_ref();
    let content = read(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => parse_config_yaml(&content),
        _ => parse_config_json(&content),
    }
}

/// Parse a tap config from a JSON string.
pub fn parse_config_json(json: &str) -> Result<TapConfig, ConfigError> {
    from_value(serde_json::from_str(json)?)
}

/// Parse a tap config from a YAML string.
pub fn parse_config_yaml(yaml: &str) -> Result<TapConfig, ConfigError> {
    from_value(serde_yaml::from_str(yaml)?)
}

fn from_value(value: Value) -> Result<TapConfig, ConfigError> {
    let object = value.as_object().ok_or(ConfigError::NotAnObject)?;
    for key in REQUIRED_CONFIG_KEYS {
        if !object.contains_key(*key) {
            return Err(ConfigError::MissingKey(key.to_string()));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Load an operator-supplied catalog document.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, ConfigError> {
    let content = read(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_plugin_string_becomes_list() {
        let config = parse_config_json(r#"{"plugins": "my-plugin"}"#).unwrap();
        assert_eq!(config.plugins(), vec!["my-plugin"]);
    }

    #[test]
    fn plugin_list_keeps_order() {
        let config = parse_config_json(r#"{"plugins": ["b", "a", "c"], "extra": 1}"#).unwrap();
        assert_eq!(config.plugins(), vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_plugins_is_reported_by_name() {
        let err = parse_config_json(r#"{"plugin": "typo"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref k) if k == "plugins"));
        assert!(matches!(Error::from(err), Error::MissingConfigKey(k) if k == "plugins"));
    }

    #[test]
    fn non_object_config_is_rejected() {
        assert!(matches!(
            parse_config_json(r#"["a"]"#),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
plugins:
  - woocommerce
  - akismet
"#;
        let config = parse_config_yaml(yaml).unwrap();
        assert_eq!(config.plugins(), vec!["woocommerce", "akismet"]);
    }

    #[test]
    fn load_config_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"plugins": ["a"]}"#)
            .unwrap();
        assert_eq!(load_config(&json_path).unwrap().plugins(), vec!["a"]);

        let yaml_path = dir.path().join("config.yml");
        std::fs::File::create(&yaml_path)
            .unwrap()
            .write_all(b"plugins: b\n")
            .unwrap();
        assert_eq!(load_config(&yaml_path).unwrap().plugins(), vec!["b"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_config("/nonexistent/config.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
