use serde::Deserialize;

/// Tap configuration. `plugins` is the only required key.
#[derive(Debug, Deserialize)]
pub struct TapConfig {
    pub plugins: StringOrVec,
}

impl TapConfig {
    /// Plugin identifiers in configured order.
    pub fn plugins(&self) -> Vec<String> {
        self.plugins.clone().into_vec()
    }
}

/// Allows a key to hold either a single string or a list of strings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrVec::Single(s) => vec![s],
            StringOrVec::Multiple(v) => v,
        }
    }
}
