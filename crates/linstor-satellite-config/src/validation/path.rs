use std::fmt::{Display, Write};

/// A single step in a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A named field of a struct, rendered as `.name`.
    Field(String),

    /// An element of a list, rendered as `.0`.
    Index(usize),

    /// An entry of a map, rendered as `[key]`.
    Key(String),
}

/// The location of a value inside a (nested) configuration document.
///
/// Paths are immutable. Descending into a sub-structure returns a new path and
/// leaves `self` untouched, so a validator can hand `path.child("lvm")` to a
/// nested check and keep using `path` afterwards.
///
/// ```
/// use linstor_satellite_config::validation::FieldPath;
///
/// let pools = FieldPath::new("spec").child("storagePools");
///
/// assert_eq!(pools.index(1).child("lvm").to_string(), "spec.storagePools.1.lvm");
/// assert_eq!(
///     FieldPath::new("spec").child("nodeSelector").key("example.com/key2").to_string(),
///     "spec.nodeSelector[example.com/key2]"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Creates a path consisting of a single root field.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Field(root.into())],
        }
    }

    /// Creates a path without any segments. It renders as an empty string.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Field(name.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(Segment::Key(key.into()))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);

        Self { segments }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        f.write_char('.')?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(index) => {
                    if i > 0 {
                        f.write_char('.')?;
                    }
                    write!(f, "{index}")?;
                }
                Segment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}
