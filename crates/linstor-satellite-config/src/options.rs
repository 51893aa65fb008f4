//! Contains the options to configure the validation of
//! [`LinstorSatelliteConfiguration`][crate::crd::LinstorSatelliteConfiguration]s.

/// Specifies the available validator options.
///
/// The [`Default`] implementation accepts patches for any resource kind.
///
/// ### Example
///
/// ```
/// use linstor_satellite_config::ValidatorOptions;
///
/// let options = ValidatorOptions::builder()
///     .add_known_patch_kind("Pod")
///     .add_known_patch_kind("ConfigMap")
///     .build();
///
/// assert!(options.is_known_patch_kind("Pod"));
/// assert!(!options.is_known_patch_kind("Secret"));
/// ```
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Resource kinds patches may target. Leave empty to accept any kind.
    #[cfg_attr(
        feature = "clap",
        arg(long, env, value_name = "KIND", value_delimiter = ',')
    )]
    pub known_patch_kinds: Vec<String>,
}

impl ValidatorOptions {
    /// Returns the default [`ValidatorOptionsBuilder`] which allows to
    /// selectively customize the options.
    pub fn builder() -> ValidatorOptionsBuilder {
        ValidatorOptionsBuilder::default()
    }

    /// Returns `true` if patches may target resources of the given `kind`.
    pub fn is_known_patch_kind(&self, kind: &str) -> bool {
        self.known_patch_kinds.is_empty() || self.known_patch_kinds.iter().any(|k| k == kind)
    }
}

/// The [`ValidatorOptionsBuilder`] which allows to selectively customize the
/// [`ValidatorOptions`].
///
/// Usually, this struct is not constructed manually, but instead by calling
/// [`ValidatorOptions::builder()`].
#[derive(Debug, Default)]
pub struct ValidatorOptionsBuilder {
    known_patch_kinds: Vec<String>,
}

impl ValidatorOptionsBuilder {
    /// Restricts patches to the given resource kinds, replacing any kinds set
    /// before.
    pub fn known_patch_kinds(mut self, kinds: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.known_patch_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a single resource kind to the list of known patch kinds.
    pub fn add_known_patch_kind(mut self, kind: impl Into<String>) -> Self {
        self.known_patch_kinds.push(kind.into());
        self
    }

    pub fn build(self) -> ValidatorOptions {
        ValidatorOptions {
            known_patch_kinds: self.known_patch_kinds,
        }
    }
}
