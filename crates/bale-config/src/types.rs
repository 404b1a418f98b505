use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A configuration value that may be written either as a single string or
/// as a list of strings.
///
/// `"jquery"` and `["jquery"]` normalize to the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Normalize into a list, preserving declaration order.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Raw `assets` section: where CSS-referenced files are copied and the URL
/// prefix the rewritten references use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}
