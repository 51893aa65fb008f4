//! Validated Kubernetes label keys and values.
//!
//! Node selectors and node field references (`metadata.labels['<key>']`) both
//! use the label syntax of the API server. The types in this module can only
//! be constructed from valid input, so holding a [`Key`] or a [`LabelValue`] is
//! proof that the string passed validation.
mod key;
mod value;

pub use key::*;
pub use value::*;
