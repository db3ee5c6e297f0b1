//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Options for the XML documents written by the codec.
///
/// Parsing is not configurable; these only shape serialized output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Emit `<?xml version="1.0" encoding="utf-8"?>` before the root element.
    /// Default: true
    pub xml_declaration: bool,

    /// Pretty-print with this many spaces per level (None = compact).
    /// Default: None
    pub indent: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: None,
        }
    }
}

impl CodecConfig {
    /// Compact output with no declaration, as embedded payloads are sent.
    pub fn fragment() -> Self {
        Self {
            xml_declaration: false,
            indent: None,
        }
    }

    /// Load from a JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
