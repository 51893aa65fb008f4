use std::{collections::BTreeMap, str::FromStr};

use crate::{
    kvp::{Key, LabelValue},
    validation::{Causes, FieldPath},
};

/// Validates the label keys and values of a node selector.
///
/// An invalid key is reported at `path` itself, an invalid value at
/// `path[<key>]`. Both are checked independently, so an entry with an invalid
/// key and an invalid value yields two causes.
pub fn validate_node_selector(
    causes: &mut Causes,
    path: &FieldPath,
    selector: &BTreeMap<String, String>,
) {
    for (key, value) in selector {
        if let Err(err) = Key::from_str(key) {
            causes.syntax(path.clone(), key, err);
        }

        if let Err(err) = LabelValue::from_str(value) {
            causes.syntax(path.key(key), value, err);
        }
    }
}
