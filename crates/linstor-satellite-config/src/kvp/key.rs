use std::{fmt::Display, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{ResultExt, Snafu, ensure};

const KEY_PREFIX_MAX_LEN: usize = 253;
const KEY_NAME_MAX_LEN: usize = 63;

// Lazily initialized regular expressions
static KEY_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("failed to compile key prefix regex")
});

static KEY_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$")
        .expect("failed to compile key name regex")
});

/// The error type for key parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyError {
    /// The key must at least contain a name. The prefix is optional.
    #[snafu(display("key cannot be empty"))]
    EmptyInput,

    /// Keys like `example.com/nested/name` contain more than one slash.
    #[snafu(display("a qualified name may contain at most one '/'"))]
    NestedPrefix,

    #[snafu(display("prefix part {source}"))]
    KeyPrefixError { source: KeyPrefixError },

    #[snafu(display("name part {source}"))]
    KeyNameError { source: KeyNameError },
}

/// A label key, also known as a qualified name.
///
/// The general format is `(<PREFIX>/)<NAME>`, where the prefix is a DNS
/// subdomain and the name a short alphanumeric segment. Instances are always
/// valid, see the [Kubernetes documentation][k8s-labels] for the exact rules.
///
/// [k8s-labels]: https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    prefix: Option<KeyPrefix>,
    name: KeyName,
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), EmptyInputSnafu);

        let parts = input.split('/').collect::<Vec<_>>();

        let (prefix, name) = match parts[..] {
            [name] => (None, name),
            [prefix, name] => (Some(prefix), name),
            _ => return NestedPrefixSnafu.fail(),
        };

        Ok(Self {
            prefix: prefix
                .map(KeyPrefix::from_str)
                .transpose()
                .context(KeyPrefixSnafu)?,
            name: KeyName::from_str(name).context(KeyNameSnafu)?,
        })
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}/{}", prefix, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Key {
    pub fn prefix(&self) -> Option<&KeyPrefix> {
        self.prefix.as_ref()
    }

    pub fn name(&self) -> &KeyName {
        &self.name
    }
}

/// The error type for key prefix parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyPrefixError {
    /// Rejects keys like `/name`, where the slash announces a prefix which is
    /// not there.
    #[snafu(display("cannot be empty"))]
    PrefixEmpty,

    #[snafu(display("must be no more than 253 characters, got {length}"))]
    PrefixTooLong { length: usize },

    #[snafu(display(
        "must be a lowercase RFC 1123 subdomain: alphanumeric characters, '-' or '.', starting and ending with an alphanumeric character (e.g. 'example.com')"
    ))]
    PrefixInvalid,
}

/// The validated optional DNS subdomain prefix of a [`Key`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPrefix(String);

impl FromStr for KeyPrefix {
    type Err = KeyPrefixError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), PrefixEmptySnafu);
        ensure!(
            input.len() <= KEY_PREFIX_MAX_LEN,
            PrefixTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(KEY_PREFIX_REGEX.is_match(input), PrefixInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyPrefix {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The error type for key name parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyNameError {
    #[snafu(display("cannot be empty"))]
    NameEmpty,

    #[snafu(display("must be no more than 63 characters, got {length}"))]
    NameTooLong { length: usize },

    #[snafu(display(
        "must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyName', 'my.name' or '123-abc')"
    ))]
    NameInvalid,
}

/// The validated, required name segment of a [`Key`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyName(String);

impl FromStr for KeyName {
    type Err = KeyNameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), NameEmptySnafu);
        ensure!(
            input.len() <= KEY_NAME_MAX_LEN,
            NameTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(KEY_NAME_REGEX.is_match(input), NameInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
