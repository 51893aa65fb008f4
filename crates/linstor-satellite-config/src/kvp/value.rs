use std::{fmt::Display, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{Snafu, ensure};

const LABEL_VALUE_MAX_LEN: usize = 63;

// Unlike key names, label values may be empty
static LABEL_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$")
        .expect("failed to compile label value regex")
});

/// The error type for label value parse/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum LabelValueError {
    #[snafu(display("must be no more than 63 characters, got {length}"))]
    ValueTooLong { length: usize },

    #[snafu(display(
        "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyValue', or 'my_value', or '12345')"
    ))]
    ValueInvalid,
}

/// A validated Kubernetes label value.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LabelValue(String);

impl FromStr for LabelValue {
    type Err = LabelValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(
            input.len() <= LABEL_VALUE_MAX_LEN,
            ValueTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(LABEL_VALUE_REGEX.is_match(input), ValueInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for LabelValue {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("valid-label")]
    #[case("node-1.example.com")]
    #[case("a_b")]
    fn valid_value(#[case] input: &str) {
        LabelValue::from_str(input).expect("value must be valid");
    }

    #[rstest]
    #[case("a".repeat(64), LabelValueError::ValueTooLong { length: 64 })]
    #[case("not a valid value".to_owned(), LabelValueError::ValueInvalid)]
    #[case("foo-".to_owned(), LabelValueError::ValueInvalid)]
    #[case("ä".to_owned(), LabelValueError::ValueInvalid)]
    fn invalid_value(#[case] input: String, #[case] error: LabelValueError) {
        assert_eq!(LabelValue::from_str(&input).unwrap_err(), error);
    }
}
