use serde_json::{Map, Value};
use snafu::Snafu;

use crate::validation::FieldPath;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum MergeError {
    #[snafu(display("cannot merge a mapping into {found} at {field}"))]
    MappingOverValue { field: FieldPath, found: &'static str },

    #[snafu(display("cannot replace the mapping at {field} with {found}"))]
    ValueOverMapping { field: FieldPath, found: &'static str },
}

/// Merges `overlay` into `base` and returns the result.
///
/// - mappings are merged key by key, recursively
/// - sequences and scalars replace the base value
/// - `null` removes the key from the base
///
/// Overlaying a mapping onto a sequence or scalar, or the other way around,
/// fails with the path of the offending key.
pub fn merge(
    base: Map<String, Value>,
    overlay: Map<String, Value>,
) -> Result<Map<String, Value>, MergeError> {
    merge_at(&FieldPath::root(), base, overlay)
}

fn merge_at(
    path: &FieldPath,
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
) -> Result<Map<String, Value>, MergeError> {
    for (key, value) in overlay {
        let field = if key.contains(['.', '/']) {
            path.key(key.as_str())
        } else {
            path.child(key.as_str())
        };

        let merged = match (base.remove(&key), value) {
            (_, Value::Null) => continue,
            (None | Some(Value::Null), Value::Object(overlay)) => {
                Value::Object(merge_at(&field, Map::new(), overlay)?)
            }
            (Some(Value::Object(existing)), Value::Object(overlay)) => {
                Value::Object(merge_at(&field, existing, overlay)?)
            }
            (Some(Value::Object(_)), value) => {
                return ValueOverMappingSnafu {
                    field,
                    found: value_kind(&value),
                }
                .fail();
            }
            (Some(existing), Value::Object(_)) => {
                return MappingOverValueSnafu {
                    field,
                    found: value_kind(&existing),
                }
                .fail();
            }
            (_, value) => value,
        };

        base.insert(key, merged);
    }

    Ok(base)
}

/// A short description of the JSON type of `value`, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
