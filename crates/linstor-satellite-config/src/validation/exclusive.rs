use crate::validation::{Causes, FieldPath};

/// Where the cause for an exactly-one-of group with multiple members is
/// reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictPlacement {
    /// At the second member found in scan order, e.g. `storagePools.1.lvm`.
    SecondMember,

    /// At the entry holding the group, e.g. `properties.3`.
    Entry,
}

/// Checks that exactly one member of a group of optional fields is set.
///
/// `members` pairs the serialized field name with the parsed variant of every
/// member, in scan order. On success the single variant is returned so that
/// callers can run their type-specific checks on it. Otherwise a single
/// cardinality cause is recorded and [`None`] is returned.
///
/// The group is described by `noun` in the messages, which read
/// `at least one <noun> must be specified` and `exactly one <noun> allowed`.
pub fn exactly_one<T, I>(
    causes: &mut Causes,
    path: &FieldPath,
    noun: &str,
    placement: ConflictPlacement,
    members: I,
) -> Option<T>
where
    I: IntoIterator<Item = (&'static str, Option<T>)>,
{
    let mut set = members
        .into_iter()
        .filter_map(|(name, member)| member.map(|member| (name, member)));

    let Some((_, first)) = set.next() else {
        causes.missing_member(path.clone(), format!("at least one {noun} must be specified"));
        return None;
    };

    match set.next() {
        None => Some(first),
        Some((second, _)) => {
            let field = match placement {
                ConflictPlacement::SecondMember => path.child(second),
                ConflictPlacement::Entry => path.clone(),
            };
            causes.conflicting_member(field, format!("exactly one {noun} allowed"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::validation::{CauseKind, Reason};

    #[rstest]
    #[case(&[None, None, None], None)]
    #[case(&[None, Some(2), None], None)]
    #[case(&[Some(1), None, Some(3)], Some("entry.c"))]
    #[case(&[Some(1), Some(2), Some(3)], Some("entry.b"))]
    fn conflict_at_second_member(#[case] values: &[Option<u8>], #[case] field: Option<&str>) {
        let mut causes = Causes::new();
        let members = ["a", "b", "c"].into_iter().zip(values.iter().copied());

        exactly_one(
            &mut causes,
            &FieldPath::new("entry"),
            "letter",
            ConflictPlacement::SecondMember,
            members,
        );

        let conflict = causes
            .iter()
            .find(|c| c.reason == Reason::Forbidden)
            .map(|c| c.field.to_string());
        assert_eq!(conflict.as_deref(), field);
    }

    #[test]
    fn single_member_is_returned() {
        let mut causes = Causes::new();
        let members = [("value", None), ("valueFrom", Some("metadata.name"))];

        let member = exactly_one(
            &mut causes,
            &FieldPath::new("properties").index(0),
            "of value or valueFrom",
            ConflictPlacement::Entry,
            members,
        );

        assert_eq!(member, Some("metadata.name"));
        assert!(causes.is_empty());
    }

    #[test]
    fn missing_member_at_entry() {
        let mut causes = Causes::new();

        let member = exactly_one::<(), _>(
            &mut causes,
            &FieldPath::new("storagePools").index(0),
            "backing type",
            ConflictPlacement::SecondMember,
            [("lvm", None), ("zfs", None)],
        );

        assert_eq!(member, None);
        let cause = causes.iter().next().unwrap();
        assert_eq!(cause.kind, CauseKind::Cardinality);
        assert_eq!(cause.field.to_string(), "storagePools.0");
        assert_eq!(
            cause.message,
            "Required value: at least one backing type must be specified"
        );
    }

    #[test]
    fn conflict_at_entry() {
        let mut causes = Causes::new();

        exactly_one(
            &mut causes,
            &FieldPath::new("properties").index(3),
            "of value or valueFrom",
            ConflictPlacement::Entry,
            [("value", Some(1)), ("valueFrom", Some(2))],
        );

        let cause = causes.iter().next().unwrap();
        assert_eq!(cause.field.to_string(), "properties.3");
        assert_eq!(cause.message, "Forbidden: exactly one of value or valueFrom allowed");
    }
}
