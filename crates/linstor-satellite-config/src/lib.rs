//! Validation and patching for `LinstorSatelliteConfiguration` resources.
//!
//! A `LinstorSatelliteConfiguration` tells a storage operator how to deploy
//! and tune the LINSTOR satellites on a set of nodes. This crate provides the
//! two pieces of logic sitting between the user and the running satellites:
//!
//! - [`validation`] checks a configuration before it is admitted and reports
//!   every problem, qualified with the path of the offending field. The
//!   [`admission`] module wraps the result in an admission response.
//! - [`patch`] applies the patches of an admitted configuration to the
//!   manifests generated for a satellite.
//!
//! Node properties that read their value from the Kubernetes node are
//! resolved by [`property::resolve_properties`].
//!
//! ## Features
//!
//! - `clap`: derives `clap::Args` for [`ValidatorOptions`], making the
//!   options available as CLI arguments and environment variables.
pub mod admission;
pub mod crd;
pub mod kvp;
pub mod options;
pub mod patch;
pub mod property;
pub mod validation;

pub use options::ValidatorOptions;
