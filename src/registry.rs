//! Record of widget tags defined with the hosting document.
//!
//! Tags are defined once during module startup and never redefined or
//! removed; the browser's own element registry has the same semantics.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::BTreeSet;

use crate::config::Variant;

/// Error returned by [`Registry::check`] and [`Registry::define`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The tag was already defined.
    #[error("custom element <{0}> is already defined")]
    AlreadyDefined(&'static str),
    /// Custom element names must start with a lowercase ASCII letter and
    /// contain a hyphen.
    #[error("invalid custom element name: {0:?}")]
    InvalidTag(&'static str),
    /// The hosting document refused the definition.
    #[error("hosting document rejected <{tag}>: {reason}")]
    Rejected { tag: &'static str, reason: String },
}

/// Tags defined so far.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    defined: BTreeSet<&'static str>,
}

impl Registry {
    /// Whether `variant` could be defined now. Records nothing.
    pub fn check(&self, variant: &Variant) -> Result<(), RegistryError> {
        if !is_valid_tag(variant.tag) {
            return Err(RegistryError::InvalidTag(variant.tag));
        }
        if self.defined.contains(variant.tag) {
            return Err(RegistryError::AlreadyDefined(variant.tag));
        }
        Ok(())
    }

    /// Record `variant`'s tag once the document has accepted it.
    pub fn define(&mut self, variant: &Variant) -> Result<(), RegistryError> {
        self.check(variant)?;
        self.defined.insert(variant.tag);
        Ok(())
    }
}

fn is_valid_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && !tag.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace())
}
