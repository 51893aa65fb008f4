//! Node field references and their resolution against live [`Node`] objects.
//!
//! A [`LinstorNodeProperty`] either carries a literal value or reads its value
//! from a field of the Kubernetes node the satellite runs on. Admission only
//! checks that the reference is well-formed (see [`NodeFieldRef::from_str`]),
//! the actual lookup happens whenever the satellite configuration is rendered
//! for a specific node.
use std::{collections::BTreeMap, fmt::Display, str::FromStr, sync::LazyLock};

use k8s_openapi::api::core::v1::Node;
use kube::ResourceExt;
use regex::Regex;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::instrument;

use crate::{
    crd::LinstorNodeProperty,
    kvp::{Key, KeyError},
};

static MAP_LOOKUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^metadata\.(labels|annotations)\['([^']*)'\]$")
        .expect("failed to compile node field lookup regex")
});

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseNodeFieldRefError {
    #[snafu(display(
        "unsupported node field reference, supported are \"metadata.name\", \"metadata.uid\", \"metadata.labels['<key>']\" and \"metadata.annotations['<key>']\""
    ))]
    UnsupportedField,

    #[snafu(display("invalid {map} key: {source}"))]
    InvalidMapKey {
        map: &'static str,
        source: KeyError,
    },
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("node {node:?} has no field {field}"))]
    FieldAbsent { node: String, field: NodeFieldRef },

    #[snafu(display("failed to parse the node field reference of property {property:?}"))]
    ParseFieldRef {
        property: String,
        source: ParseNodeFieldRefError,
    },

    #[snafu(display("property {property:?} sets neither value nor valueFrom"))]
    MissingValueSource { property: String },
}

/// A reference to a field of a Kubernetes [`Node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeFieldRef {
    /// `metadata.name`
    Name,

    /// `metadata.uid`
    Uid,

    /// `metadata.labels['<key>']`
    Label(Key),

    /// `metadata.annotations['<key>']`
    Annotation(Key),
}

impl FromStr for NodeFieldRef {
    type Err = ParseNodeFieldRefError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "metadata.name" => return Ok(Self::Name),
            "metadata.uid" => return Ok(Self::Uid),
            _ => {}
        }

        let captures = MAP_LOOKUP_REGEX
            .captures(input)
            .context(UnsupportedFieldSnafu)?;

        match (&captures[1], &captures[2]) {
            ("labels", key) => Ok(Self::Label(
                Key::from_str(key).context(InvalidMapKeySnafu { map: "label" })?,
            )),
            (_, key) => Ok(Self::Annotation(
                Key::from_str(key).context(InvalidMapKeySnafu { map: "annotation" })?,
            )),
        }
    }
}

impl Display for NodeFieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => f.write_str("metadata.name"),
            Self::Uid => f.write_str("metadata.uid"),
            Self::Label(key) => write!(f, "metadata.labels['{key}']"),
            Self::Annotation(key) => write!(f, "metadata.annotations['{key}']"),
        }
    }
}

impl NodeFieldRef {
    /// Reads the referenced field from `node`.
    pub fn resolve(&self, node: &Node) -> Result<String> {
        let value = match self {
            Self::Name => node.metadata.name.clone(),
            Self::Uid => node.metadata.uid.clone(),
            Self::Label(key) => node.labels().get(&key.to_string()).cloned(),
            Self::Annotation(key) => node.annotations().get(&key.to_string()).cloned(),
        };

        value.context(FieldAbsentSnafu {
            node: node.name_any(),
            field: self.clone(),
        })
    }
}

/// Computes the LINSTOR node properties for `node`.
///
/// Literal values are taken as they are, references are resolved against the
/// node. Properties marked as optional are left out if the referenced field
/// doesn't exist, any other missing field fails the whole resolution.
#[instrument(skip_all, fields(node.name = %node.name_any()))]
pub fn resolve_properties(
    properties: &[LinstorNodeProperty],
    node: &Node,
) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();

    for property in properties {
        let value = match (property.literal_value(), &property.value_from) {
            (Some(value), _) => value.to_owned(),
            (None, Some(value_from)) => {
                let field_ref = NodeFieldRef::from_str(&value_from.node_field_ref)
                    .context(ParseFieldRefSnafu {
                        property: &property.name,
                    })?;

                match field_ref.resolve(node) {
                    Ok(value) => value,
                    Err(Error::FieldAbsent { field, .. }) if property.optional => {
                        tracing::debug!(
                            property.name = %property.name,
                            %field,
                            "skipping optional property, node field is absent"
                        );
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }
            (None, None) => {
                return MissingValueSourceSnafu {
                    property: &property.name,
                }
                .fail();
            }
        };

        resolved.insert(property.name.clone(), value);
    }

    tracing::debug!(properties.count = resolved.len(), "resolved node properties");
    Ok(resolved)
}
