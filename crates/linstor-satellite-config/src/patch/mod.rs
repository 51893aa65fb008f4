//! Applies the [`Patch`]es of a satellite configuration to generated manifests.
//!
//! Patches are applied one after another. Each patch selects exactly one of
//! the manifests (see [`select_target`]), parses its content as an overlay and
//! merges it into the current state of that manifest (see [`merge()`]). Later
//! patches see the result of earlier ones, so for overlapping fields the last
//! patch wins.
//!
//! Application stops at the first patch that cannot be applied. The returned
//! [`PatchApplicationError`] names the patch and carries the manifests with
//! all earlier patches applied, so the caller can decide what to do with the
//! partial result.
use kube::core::DynamicObject;
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::instrument;

use crate::crd::{Patch, Selector};

mod merge;
mod target;

pub use merge::*;
pub use target::*;

#[derive(Debug, Snafu)]
pub enum OverlayError {
    #[snafu(display("invalid YAML: {source}"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("patch content must be a mapping, got {found}"))]
    NotAMapping { found: &'static str },
}

/// Parses patch content into an overlay document.
///
/// The content may be YAML or JSON and must contain a single mapping.
pub fn parse_overlay(content: &str) -> Result<Map<String, Value>, OverlayError> {
    match serde_yaml::from_str::<Value>(content).context(ParseYamlSnafu)? {
        Value::Object(overlay) => Ok(overlay),
        other => NotAMappingSnafu {
            found: value_kind(&other),
        }
        .fail(),
    }
}

/// Returns the target of a patch without explicit target, taken from the
/// `kind` and `metadata.name` of the overlay.
pub fn implied_target(overlay: &Map<String, Value>) -> Option<Selector> {
    let kind = overlay.get("kind")?.as_str()?;
    let name = overlay
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str);

    let selector = Selector::new(kind);
    Some(match name {
        Some(name) => selector.with_name(name),
        None => selector,
    })
}

#[derive(Debug, Snafu)]
pub enum PatchError {
    #[snafu(display("failed to parse the patch content"))]
    ParseOverlay { source: OverlayError },

    #[snafu(display("the patch has no target and its content does not name a kind"))]
    MissingTarget,

    #[snafu(display("failed to select the patch target"))]
    SelectTarget { source: SelectError },

    #[snafu(display(
        "the patch content sets {field} to {found}, but the target has {}",
        expected.as_deref().unwrap_or("none")
    ))]
    ContradictsTarget {
        field: &'static str,
        found: Value,
        expected: Option<String>,
    },

    #[snafu(display("failed to convert the target manifest"))]
    ConvertManifest { source: serde_json::Error },

    #[snafu(display("failed to merge the patch content into the target"))]
    MergeOverlay { source: MergeError },

    #[snafu(display("the patched manifest is not a valid object"))]
    ConvertPatchedManifest { source: serde_json::Error },
}

/// A patch which could not be applied.
#[derive(Debug, Snafu)]
#[snafu(display(
    "failed to apply patch {index}{}",
    target.as_ref().map(|target| format!(" to {target}")).unwrap_or_default()
))]
pub struct PatchApplicationError {
    /// Position of the failed patch in the patch list.
    pub index: usize,

    /// The declared or implied target of the patch, if it could be determined.
    pub target: Option<Selector>,

    pub source: PatchError,

    /// The manifests with all patches before `index` applied.
    pub applied: Vec<DynamicObject>,
}

/// Applies `patches` in order to a copy of `manifests`.
///
/// `manifests` is left untouched. An empty patch list returns the manifests
/// unchanged.
#[instrument(skip_all, fields(patches.count = patches.len(), manifests.count = manifests.len()))]
pub fn apply_patches(
    patches: &[Patch],
    manifests: &[DynamicObject],
) -> Result<Vec<DynamicObject>, PatchApplicationError> {
    let patched = patches.iter().enumerate().try_fold(
        manifests.to_vec(),
        |mut applied, (index, patch)| {
            let mut target = patch.target.clone();

            let result = prepare_patch(patch).and_then(|(selector, overlay)| {
                let outcome = apply_overlay(&selector, overlay, &applied);
                target = Some(selector);
                outcome
            });

            match result {
                Ok((position, manifest)) => {
                    tracing::debug!(
                        patch.index = index,
                        target.kind = target.as_ref().map(|t| t.kind.as_str()),
                        target.name = target.as_ref().and_then(|t| t.name.as_deref()),
                        "applied patch"
                    );
                    applied[position] = manifest;
                    Ok(applied)
                }
                Err(source) => {
                    tracing::warn!(
                        patch.index = index,
                        error = &source as &dyn std::error::Error,
                        "failed to apply patch"
                    );
                    Err(source).context(PatchApplicationSnafu {
                        index,
                        target,
                        applied,
                    })
                }
            }
        },
    )?;

    tracing::info!("applied all patches");
    Ok(patched)
}

fn prepare_patch(patch: &Patch) -> Result<(Selector, Map<String, Value>), PatchError> {
    let overlay = parse_overlay(&patch.content).context(ParseOverlaySnafu)?;
    let selector = match &patch.target {
        Some(selector) => selector.clone(),
        None => implied_target(&overlay).context(MissingTargetSnafu)?,
    };

    Ok((selector, overlay))
}

/// Merges `overlay` into the manifest selected by `selector` and returns the
/// position of that manifest together with its new state.
fn apply_overlay(
    selector: &Selector,
    overlay: Map<String, Value>,
    manifests: &[DynamicObject],
) -> Result<(usize, DynamicObject), PatchError> {
    let position = select_target(selector, manifests).context(SelectTargetSnafu)?;
    let manifest = &manifests[position];

    ensure_identity(&overlay, manifest)?;

    let base = serde_json::to_value(manifest)
        .and_then(serde_json::from_value)
        .context(ConvertManifestSnafu)?;
    let merged = merge(base, overlay).context(MergeOverlaySnafu)?;
    let patched =
        serde_json::from_value(Value::Object(merged)).context(ConvertPatchedManifestSnafu)?;

    Ok((position, patched))
}

/// Patches can't move a manifest to a different type or name.
fn ensure_identity(
    overlay: &Map<String, Value>,
    manifest: &DynamicObject,
) -> Result<(), PatchError> {
    let types = manifest.types.as_ref();
    let identity = [
        (
            "apiVersion",
            overlay.get("apiVersion"),
            types.map(|types| types.api_version.as_str()),
        ),
        (
            "kind",
            overlay.get("kind"),
            types.map(|types| types.kind.as_str()),
        ),
        (
            "metadata.name",
            overlay.get("metadata").and_then(|metadata| {
                // A null mapping removes the name along with it
                if metadata.is_null() {
                    Some(metadata)
                } else {
                    metadata.get("name")
                }
            }),
            manifest.metadata.name.as_deref(),
        ),
    ];

    for (field, found, expected) in identity {
        let Some(found) = found else {
            continue;
        };

        if found.as_str() != expected {
            return ContradictsTargetSnafu {
                field,
                found: found.clone(),
                expected: expected.map(ToOwned::to_owned),
            }
            .fail();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    fn manifests() -> Vec<DynamicObject> {
        serde_yaml::Deserializer::from_str(indoc! {"
            apiVersion: v1
            kind: Pod
            metadata:
              name: satellite
            spec:
              hostNetwork: false
              containers:
                - name: linstor-satellite
                  image: linstor-satellite:v1
            ---
            apiVersion: v1
            kind: ConfigMap
            metadata:
              name: satellite-config
            data:
              linstor_satellite.toml: |
                [netcom]
                port = 3366
            ---
            apiVersion: v1
            kind: ConfigMap
            metadata:
              name: reactor-config
            data: {}
        "})
        .map(|document| serde::Deserialize::deserialize(document).unwrap())
        .collect()
    }

    fn patch(target: Option<Selector>, content: &str) -> Patch {
        Patch {
            target,
            content: content.to_owned(),
        }
    }

    fn data(object: &DynamicObject) -> &Value {
        &object.data
    }

    #[test]
    fn empty_patch_list_is_identity() {
        let manifests = manifests();
        assert_eq!(apply_patches(&[], &manifests).unwrap(), manifests);
    }

    #[test]
    fn later_patches_see_earlier_results() {
        let manifests = manifests();
        let patches = [
            patch(
                Some(Selector::new("Pod").with_name("satellite")),
                indoc! {"
                    spec:
                      hostNetwork: true
                      priorityClassName: system-node-critical
                "},
            ),
            patch(
                Some(Selector::new("Pod")),
                indoc! {"
                    spec:
                      priorityClassName: linstor-critical
                "},
            ),
        ];

        let first = apply_patches(&patches, &manifests).unwrap();
        let second = apply_patches(&patches, &manifests).unwrap();

        assert_eq!(first, second);
        assert_eq!(data(&first[0])["spec"]["hostNetwork"], json!(true));
        assert_eq!(data(&first[0])["spec"]["priorityClassName"], json!("linstor-critical"));
        assert_eq!(
            data(&first[0])["spec"]["containers"][0]["image"],
            json!("linstor-satellite:v1")
        );
        assert_eq!(first[1..], manifests[1..]);
        // The input manifests are never modified
        assert_eq!(data(&manifests[0])["spec"]["hostNetwork"], json!(false));
    }

    #[test]
    fn target_implied_by_content() {
        let patches = [patch(
            None,
            indoc! {"
                apiVersion: v1
                kind: ConfigMap
                metadata:
                  name: reactor-config
                data:
                  prometheus.toml: '[[prometheus]]'
            "},
        )];

        let patched = apply_patches(&patches, &manifests()).unwrap();
        assert_eq!(data(&patched[2])["data"]["prometheus.toml"], json!("[[prometheus]]"));
    }

    #[test]
    fn failure_keeps_earlier_patches() {
        let patches = [
            patch(
                Some(Selector::new("Pod")),
                "metadata: {labels: {tier: storage}}",
            ),
            patch(Some(Selector::new("ConfigMap")), "data: {}"),
            patch(Some(Selector::new("Pod")), "metadata: {annotations: {never: applied}}"),
        ];

        let err = apply_patches(&patches, &manifests()).unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.target, Some(Selector::new("ConfigMap")));
        assert!(matches!(
            err.source,
            PatchError::SelectTarget {
                source: SelectError::Ambiguous { count: 2, .. }
            }
        ));
        assert_eq!(err.to_string(), "failed to apply patch 1 to ConfigMap");
        assert_eq!(err.applied[0].metadata.labels.as_ref().unwrap()["tier"], "storage");
        assert_eq!(err.applied[0].metadata.annotations, None);
    }

    #[test]
    fn unknown_target() {
        let patches = [patch(Some(Selector::new("DaemonSet")), "spec: {}")];

        let err = apply_patches(&patches, &manifests()).unwrap_err();
        assert!(matches!(
            err.source,
            PatchError::SelectTarget {
                source: SelectError::NotFound { .. }
            }
        ));
        assert_eq!(err.applied, manifests());
    }

    #[test]
    fn incompatible_overlay() {
        let patches = [patch(
            Some(Selector::new("Pod")),
            "spec: {containers: {name: linstor-satellite}}",
        )];

        let err = apply_patches(&patches, &manifests()).unwrap_err();
        assert!(matches!(
            &err.source,
            PatchError::MergeOverlay { source }
                if source.to_string() == "cannot merge a mapping into a sequence at spec.containers"
        ));
    }

    #[test]
    fn overlay_contradicting_target() {
        let patches = [patch(
            Some(Selector::new("Pod").with_name("satellite")),
            indoc! {"
                kind: Pod
                metadata:
                  name: controller
            "},
        )];

        let err = apply_patches(&patches, &manifests()).unwrap_err();
        assert_eq!(
            err.source.to_string(),
            "the patch content sets metadata.name to \"controller\", but the target has satellite"
        );
    }

    #[test]
    fn overlay_removing_metadata() {
        let patches = [patch(
            Some(Selector::new("Pod").with_name("satellite")),
            "metadata: null",
        )];

        let err = apply_patches(&patches, &manifests()).unwrap_err();
        assert!(matches!(
            err.source,
            PatchError::ContradictsTarget {
                field: "metadata.name",
                found: Value::Null,
                ..
            }
        ));
        assert_eq!(
            err.source.to_string(),
            "the patch content sets metadata.name to null, but the target has satellite"
        );
        assert_eq!(err.applied, manifests());
    }

    #[test]
    fn malformed_content() {
        let patches = [
            patch(None, "- not\n- a mapping\n"),
            patch(None, "metadata: {name: satellite}"),
        ];

        let err = apply_patches(&patches[..1], &manifests()).unwrap_err();
        assert_eq!(err.target, None);
        assert!(matches!(
            err.source,
            PatchError::ParseOverlay {
                source: OverlayError::NotAMapping { found: "a sequence" }
            }
        ));

        let err = apply_patches(&patches[1..], &manifests()).unwrap_err();
        assert!(matches!(err.source, PatchError::MissingTarget));
    }
}
