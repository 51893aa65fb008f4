use std::{collections::BTreeSet, str::FromStr};

use crate::{
    crd::LinstorNodeProperty,
    property::NodeFieldRef,
    validation::{
        Causes, FieldPath,
        exclusive::{ConflictPlacement, exactly_one},
    },
};

/// Validates the node properties found at `path`.
///
/// References are only checked for their shape. Whether the node actually
/// has the referenced field is not known until the properties are resolved,
/// see [`crate::property::resolve_properties`].
pub fn validate_properties(
    causes: &mut Causes,
    path: &FieldPath,
    properties: &[LinstorNodeProperty],
) {
    let mut names = BTreeSet::new();

    for (index, property) in properties.iter().enumerate() {
        let path = path.index(index);
        let field_ref = property
            .value_from
            .as_ref()
            .map(|value_from| value_from.node_field_ref.as_str());

        exactly_one(
            causes,
            &path,
            "of value or valueFrom",
            ConflictPlacement::Entry,
            [("value", property.literal_value()), ("valueFrom", field_ref)],
        );

        if property.name.is_empty() {
            causes.required(path.child("name"), "property name must be specified");
        } else if !names.insert(property.name.as_str()) {
            causes.duplicate(path.child("name"), &property.name);
        }

        if let Some((field_ref, Err(err))) =
            field_ref.map(|field_ref| (field_ref, NodeFieldRef::from_str(field_ref)))
        {
            causes.unresolvable(path.child("valueFrom"), field_ref, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::validation::{CauseKind, Reason};

    fn validate(yaml: &str) -> Causes {
        let properties: Vec<LinstorNodeProperty> =
            serde_yaml::from_str(yaml).expect("test YAML is valid");

        let mut causes = Causes::new();
        validate_properties(&mut causes, &FieldPath::new("spec").child("properties"), &properties);
        causes
    }

    #[test]
    fn valid_properties() {
        let causes = validate(indoc! {"
            - name: Aux/node-name
              valueFrom:
                nodeFieldRef: metadata.name
            - name: Aux/topology/kubernetes.io/hostname
              valueFrom:
                nodeFieldRef: metadata.labels['kubernetes.io/hostname']
            - name: Aux/topology/topology.kubernetes.io/region
              valueFrom:
                nodeFieldRef: metadata.labels['topology.kubernetes.io/region']
              optional: true
            - name: Aux/topology/topology.kubernetes.io/zone
              valueFrom:
                nodeFieldRef: metadata.labels['topology.kubernetes.io/zone']
            - name: PrefNic
              value: default-ipv4
        "});

        assert!(causes.is_empty(), "unexpected causes: {causes:?}");
    }

    #[test]
    fn value_source_cardinality() {
        let causes = validate(indoc! {"
            - name: Both
              value: foo
              valueFrom:
                nodeFieldRef: metadata.name
            - name: Neither
            - name: EmptyValue
              value: ''
        "});

        let rendered = causes.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            [
                "spec.properties.0: Forbidden: exactly one of value or valueFrom allowed",
                "spec.properties.1: Required value: at least one of value or valueFrom must be specified",
                "spec.properties.2: Required value: at least one of value or valueFrom must be specified",
            ]
        );
    }

    #[test]
    fn unrecognized_field_ref() {
        let causes = validate(indoc! {"
            - name: Aux/pod-cidr
              valueFrom:
                nodeFieldRef: spec.podCIDR
        "});

        let cause = causes.iter().next().unwrap();
        assert_eq!(causes.len(), 1);
        assert_eq!(cause.kind, CauseKind::Reference);
        assert_eq!(cause.reason, Reason::Invalid);
        assert_eq!(cause.field.to_string(), "spec.properties.0.valueFrom");
    }

    #[test]
    fn duplicate_and_missing_names() {
        let causes = validate(indoc! {"
            - name: PrefNic
              value: a
            - name: PrefNic
              value: b
            - value: c
        "});

        let rendered = causes.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            [
                "spec.properties.1.name: Duplicate value: \"PrefNic\"",
                "spec.properties.2.name: Required value: property name must be specified",
            ]
        );
    }
}
