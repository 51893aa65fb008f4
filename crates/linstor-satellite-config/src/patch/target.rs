use kube::core::DynamicObject;
use snafu::{Snafu, ensure};

use crate::crd::Selector;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum SelectError {
    #[snafu(display(
        "no resource of kind {kind}{} found",
        name.as_ref().map(|name| format!(" named {name:?}")).unwrap_or_default()
    ))]
    NotFound { kind: String, name: Option<String> },

    #[snafu(display(
        "found {count} resources of kind {kind}{}",
        match name {
            Some(name) => format!(" named {name:?}, the target is not unique"),
            None => ", a target name is required to select one of them".to_owned(),
        }
    ))]
    Ambiguous {
        kind: String,
        name: Option<String>,
        count: usize,
    },
}

/// Returns `true` if `object` is of the selected kind and, if the selector
/// names one, has the selected name.
pub fn matches(selector: &Selector, object: &DynamicObject) -> bool {
    let kind_matches = object
        .types
        .as_ref()
        .is_some_and(|types| types.kind == selector.kind);

    let name_matches = selector
        .name
        .as_ref()
        .is_none_or(|name| object.metadata.name.as_ref() == Some(name));

    kind_matches && name_matches
}

/// Finds the single candidate matched by `selector` and returns its position
/// in `candidates`.
pub fn select_target(
    selector: &Selector,
    candidates: &[DynamicObject],
) -> Result<usize, SelectError> {
    let mut matching = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| matches(selector, candidate))
        .map(|(position, _)| position);

    let Some(position) = matching.next() else {
        return NotFoundSnafu {
            kind: &selector.kind,
            name: selector.name.clone(),
        }
        .fail();
    };

    let others = matching.count();
    ensure!(
        others == 0,
        AmbiguousSnafu {
            kind: &selector.kind,
            name: selector.name.clone(),
            count: others + 1,
        }
    );

    Ok(position)
}
