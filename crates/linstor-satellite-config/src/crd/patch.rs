use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An overlay applied to one of the resources generated for the satellite.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Selects the resource to patch. When omitted, the `kind` and
    /// `metadata.name` of the patch content are used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Selector>,

    /// The overlay document in YAML (or JSON) format.
    #[serde(default, rename = "patch")]
    pub content: String,
}

/// Identifies a generated resource by kind and, optionally, name.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Selector {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.kind, name),
            None => write!(f, "{}", self.kind),
        }
    }
}
