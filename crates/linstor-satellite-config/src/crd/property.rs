use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A property set on the LINSTOR node object of every selected satellite.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorNodeProperty {
    /// Name of the property, e.g. `Aux/topology/kubernetes.io/hostname`.
    #[serde(default)]
    pub name: String,

    /// Literal value of the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Reads the value from a field of the Kubernetes node object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<LinstorNodePropertyValueFrom>,

    /// Skip the property instead of failing when the referenced node field
    /// does not exist.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinstorNodePropertyValueFrom {
    /// Field path on the node object, like `metadata.name` or
    /// `metadata.labels['kubernetes.io/hostname']`.
    #[serde(default)]
    pub node_field_ref: String,
}

impl LinstorNodeProperty {
    /// The literal value, if one is set. Empty values count as unset.
    pub fn literal_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|value| !value.is_empty())
    }
}
