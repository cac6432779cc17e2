use crate::domain::models::ObjectDescriptor;
use crate::domain::value_objects::Extension;

/// Narrows a descriptor sequence to keys ending in one extension.
///
/// Matching is an exact, case-sensitive suffix comparison. Relative order of
/// the input is preserved and nothing is ever added.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionFilter {
    extension: Extension,
}

impl ExtensionFilter {
    pub fn new(extension: Extension) -> Self {
        Self { extension }
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// Check if this filter matches an object
    pub fn matches(&self, descriptor: &ObjectDescriptor) -> bool {
        descriptor.key.has_extension(&self.extension)
    }

    /// Lazily apply the filter to any descriptor sequence
    pub fn apply<'a, I>(&'a self, descriptors: I) -> impl Iterator<Item = ObjectDescriptor> + 'a
    where
        I: IntoIterator<Item = ObjectDescriptor>,
        I::IntoIter: 'a,
    {
        descriptors.into_iter().filter(move |d| self.matches(d))
    }
}
