//! The `LinstorSatelliteConfiguration` custom resource.
//!
//! A satellite configuration selects a set of nodes and describes how the
//! LINSTOR satellite running on them is deployed (patches to the generated
//! manifests) and tuned (storage pools and node properties). Configurations
//! are cluster-scoped and may overlap, the satellite deployment combines all
//! configurations matching a node.
use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod patch;
mod property;
mod storage_pool;

pub use patch::*;
pub use property::*;
pub use storage_pool::*;

#[derive(CustomResource, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[kube(
    group = "piraeus.io",
    version = "v1",
    kind = "LinstorSatelliteConfiguration",
    plural = "linstorsatelliteconfigurations",
    shortname = "lsc"
)]
#[serde(rename_all = "camelCase")]
pub struct LinstorSatelliteConfigurationSpec {
    /// Selects the nodes the configuration applies to. An empty selector
    /// matches all nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    /// Overlays applied, in order, to the resources generated for the
    /// satellite.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<Patch>,

    /// Storage pools to configure on the selected nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage_pools: Vec<LinstorStoragePool>,

    /// Properties to set on the LINSTOR node objects of the selected nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<LinstorNodeProperty>,
}
