use std::fmt::Display;

use crate::validation::FieldPath;

/// The category of a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum CauseKind {
    /// A malformed label key or value, name or path.
    Syntax,

    /// Zero or multiple members of an exactly-one-of group are set.
    Cardinality,

    /// A type-specific sub-field is missing or must not be present.
    Structural,

    /// A value-source reference names an unrecognized node field.
    Reference,
}

/// The Kubernetes field error type of a cause.
///
/// It is reported as the `reason` of a `StatusCause`, which is why the
/// variants render with the API server's names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum Reason {
    #[strum(serialize = "FieldValueInvalid")]
    Invalid,

    #[strum(serialize = "FieldValueRequired")]
    Required,

    #[strum(serialize = "FieldValueForbidden")]
    Forbidden,

    #[strum(serialize = "FieldValueDuplicate")]
    Duplicate,

    #[strum(serialize = "FieldValueNotSupported")]
    NotSupported,
}

/// One validation failure: where it happened and what is wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cause {
    pub kind: CauseKind,
    pub reason: Reason,
    pub field: FieldPath,
    pub message: String,
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Collects [`Cause`]s in the order they are encountered.
///
/// Validators never return early: every check pushes into the same collector
/// and the caller inspects the complete list once the walk is done.
#[derive(Debug, Default)]
pub struct Causes(Vec<Cause>);

impl Causes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cause: Cause) {
        tracing::debug!(
            cause.field = %cause.field,
            cause.reason = %cause.reason,
            cause.kind = %cause.kind,
            "{}",
            cause.message
        );
        self.0.push(cause);
    }

    /// Records a value which doesn't match the expected syntax.
    pub fn syntax(&mut self, field: FieldPath, value: &str, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Syntax,
            reason: Reason::Invalid,
            field,
            message: format!("Invalid value: {value:?}: {detail}"),
        });
    }

    /// Like [`Causes::syntax`], but omits the value from the message. Used for
    /// whole documents, which are too large to repeat.
    pub fn malformed(&mut self, field: FieldPath, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Syntax,
            reason: Reason::Invalid,
            field,
            message: format!("Invalid value: {detail}"),
        });
    }

    /// Records that none of the members of an exactly-one-of group is set.
    pub fn missing_member(&mut self, field: FieldPath, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Cardinality,
            reason: Reason::Required,
            field,
            message: format!("Required value: {detail}"),
        });
    }

    /// Records that more than one member of an exactly-one-of group is set.
    pub fn conflicting_member(&mut self, field: FieldPath, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Cardinality,
            reason: Reason::Forbidden,
            field,
            message: format!("Forbidden: {detail}"),
        });
    }

    pub fn required(&mut self, field: FieldPath, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Structural,
            reason: Reason::Required,
            field,
            message: format!("Required value: {detail}"),
        });
    }

    pub fn forbidden(&mut self, field: FieldPath, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Structural,
            reason: Reason::Forbidden,
            field,
            message: format!("Forbidden: {detail}"),
        });
    }

    pub fn invalid(&mut self, field: FieldPath, value: &str, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Structural,
            reason: Reason::Invalid,
            field,
            message: format!("Invalid value: {value:?}: {detail}"),
        });
    }

    pub fn duplicate(&mut self, field: FieldPath, value: &str) {
        self.push(Cause {
            kind: CauseKind::Structural,
            reason: Reason::Duplicate,
            field,
            message: format!("Duplicate value: {value:?}"),
        });
    }

    pub fn not_supported<S>(&mut self, field: FieldPath, value: &str, supported: &[S])
    where
        S: AsRef<str>,
    {
        let supported = supported
            .iter()
            .map(|s| format!("{:?}", s.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");

        self.push(Cause {
            kind: CauseKind::Structural,
            reason: Reason::NotSupported,
            field,
            message: format!("Unsupported value: {value:?}: supported values: {supported}"),
        });
    }

    /// Records a value-source reference which cannot be resolved.
    pub fn unresolvable(&mut self, field: FieldPath, value: &str, detail: impl Display) {
        self.push(Cause {
            kind: CauseKind::Reference,
            reason: Reason::Invalid,
            field,
            message: format!("Invalid value: {value:?}: {detail}"),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cause> {
        self.0.iter()
    }

    /// Returns [`Ok`] if no cause was collected, all causes otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

impl<'a> IntoIterator for &'a Causes {
    type IntoIter = std::slice::Iter<'a, Cause>;
    type Item = &'a Cause;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The complete, ordered list of causes of a failed validation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Cause>);

impl ValidationErrors {
    pub fn causes(&self) -> &[Cause] {
        &self.0
    }

    pub fn into_causes(self) -> Vec<Cause> {
        self.0
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Same shape as the API server's aggregate: no brackets for a single error
        if let [cause] = self.0.as_slice() {
            return write!(f, "{cause}");
        }

        f.write_str("[")?;
        for (i, cause) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{cause}")?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for ValidationErrors {}
