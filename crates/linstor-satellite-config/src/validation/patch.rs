use serde_json::Value;

use crate::{
    crd::Patch,
    options::ValidatorOptions,
    patch::{implied_target, parse_overlay},
    validation::{Causes, FieldPath},
};

/// Checks that every patch is well-formed, without resolving its target.
///
/// Targets can only be resolved once the manifests for a satellite are
/// generated, which is long after the configuration was admitted.
pub fn validate_patches(
    causes: &mut Causes,
    path: &FieldPath,
    patches: &[Patch],
    options: &ValidatorOptions,
) {
    for (index, patch) in patches.iter().enumerate() {
        let path = path.index(index);

        if let Some(target) = &patch.target {
            validate_kind(causes, &path.child("target").child("kind"), &target.kind, options);
        }

        let content_path = path.child("patch");
        if patch.content.trim().is_empty() {
            causes.required(content_path, "patch content must be specified");
            continue;
        }

        let overlay = match parse_overlay(&patch.content) {
            Ok(overlay) => overlay,
            Err(err) => {
                causes.malformed(content_path, err);
                continue;
            }
        };

        match (&patch.target, overlay.get("kind")) {
            (Some(target), Some(kind)) => {
                if !target.kind.is_empty() && kind.as_str() != Some(target.kind.as_str()) {
                    causes.invalid(
                        content_path,
                        &render(kind),
                        format_args!("must match the target kind {:?}", target.kind),
                    );
                }
            }
            (Some(_), None) => {}
            (None, _) => match implied_target(&overlay) {
                Some(target) => {
                    validate_kind(causes, &content_path.child("kind"), &target.kind, options);
                }
                None => causes.required(
                    content_path.child("kind"),
                    "patch content must name its kind if no target is given",
                ),
            },
        }
    }
}

fn validate_kind(causes: &mut Causes, path: &FieldPath, kind: &str, options: &ValidatorOptions) {
    if kind.is_empty() {
        causes.required(path.clone(), "kind must be specified");
    } else if !options.is_known_patch_kind(kind) {
        causes.not_supported(path.clone(), kind, options.known_patch_kinds.as_slice());
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}
