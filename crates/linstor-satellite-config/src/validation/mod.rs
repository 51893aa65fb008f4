//! Validation of [`LinstorSatelliteConfigurationSpec`]s.
//!
//! Validation never stops at the first problem. Each validator walks its part
//! of the configuration and records every problem it finds as a [`Cause`],
//! qualified with the [`FieldPath`] of the offending value. Callers get the
//! complete list at once, in a stable order: node selector, storage pools,
//! properties and finally patches.
//!
//! ```
//! use linstor_satellite_config::{
//!     ValidatorOptions,
//!     crd::{LinstorStoragePool, LinstorSatelliteConfigurationSpec},
//!     validation::{FieldPath, validate},
//! };
//!
//! let spec = LinstorSatelliteConfigurationSpec {
//!     storage_pools: vec![LinstorStoragePool {
//!         name: "missing-type".to_owned(),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let errors = validate(&FieldPath::new("spec"), &spec, None, &ValidatorOptions::default())
//!     .unwrap_err();
//! assert_eq!(errors.causes()[0].field.to_string(), "spec.storagePools.0");
//! ```
use tracing::instrument;

use crate::{
    crd::{LinstorSatelliteConfiguration, LinstorSatelliteConfigurationSpec},
    options::ValidatorOptions,
};

mod cause;
mod exclusive;
mod patch;
mod path;
mod property;
mod selector;
mod storage_pool;

pub use cause::*;
pub use exclusive::*;
pub use patch::*;
pub use path::*;
pub use property::*;
pub use selector::*;
pub use storage_pool::*;

/// Validates a complete configuration spec found at `path`.
///
/// `old` is the previous version of the spec when an existing object is
/// updated. No check depends on it yet, every update is validated like a new
/// object.
#[instrument(skip_all, fields(path = %path))]
pub fn validate(
    path: &FieldPath,
    spec: &LinstorSatelliteConfigurationSpec,
    old: Option<&LinstorSatelliteConfigurationSpec>,
    options: &ValidatorOptions,
) -> Result<(), ValidationErrors> {
    let mut causes = Causes::new();

    validate_node_selector(&mut causes, &path.child("nodeSelector"), &spec.node_selector);
    validate_storage_pools(&mut causes, &path.child("storagePools"), &spec.storage_pools);
    validate_properties(&mut causes, &path.child("properties"), &spec.properties);
    validate_patches(&mut causes, &path.child("patches"), &spec.patches, options);

    if causes.is_empty() {
        tracing::debug!(update = old.is_some(), "configuration is valid");
    } else {
        tracing::info!(
            causes.count = causes.len(),
            update = old.is_some(),
            "configuration is invalid"
        );
    }

    causes.into_result()
}

impl LinstorSatelliteConfiguration {
    /// Validates the spec of this object, reporting fields relative to the
    /// object root (`spec.storagePools.0`).
    pub fn validate(
        &self,
        old: Option<&Self>,
        options: &ValidatorOptions,
    ) -> Result<(), ValidationErrors> {
        validate(
            &FieldPath::new("spec"),
            &self.spec,
            old.map(|old| &old.spec),
            options,
        )
    }
}
