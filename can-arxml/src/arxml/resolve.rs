//! Reference resolution
//!
//! Absolute references (`/Pkg/Elem`) are looked up directly. Relative ones
//! are prefixed with the target package of a reference base: the named base
//! if the reference carries a `BASE` attribute, the package default
//! otherwise. Bases are searched from the referencing element's path upwards,
//! considering only prefixes that denote packages.

use crate::arxml::index::ReferenceIndex;
use crate::types::{ArxmlError, Result};
use roxmltree::Node;
use std::borrow::Cow;

impl<'a, 'input> ReferenceIndex<'a, 'input> {
    /// Resolve `reference` as seen from `base`
    ///
    /// Returns `Ok(None)` if the target exists but is not an `expected_tag`
    /// element, and [`ArxmlError::DanglingReference`] if no element is
    /// registered under the resolved path.
    pub fn resolve(
        &self,
        base: Node<'a, 'input>,
        reference: &str,
        expected_tag: Option<&str>,
        base_name: Option<&str>,
    ) -> Result<Option<Node<'a, 'input>>> {
        let reference = reference.trim();
        let absolute: Cow<'_, str> = if reference.starts_with('/') {
            Cow::Borrowed(reference)
        } else {
            let base_package = self.reference_base_package(base, reference, base_name)?;
            Cow::Owned(format!("{}/{}", base_package, reference))
        };

        let target = self.node(&absolute).ok_or_else(|| ArxmlError::DanglingReference {
            reference: absolute.to_string(),
            dest: expected_tag.map(str::to_string),
        })?;

        match expected_tag {
            Some(tag) if !self.is_tag(target, tag) => {
                log::debug!(
                    "Reference '{}' points to a {} element, expected {}",
                    absolute,
                    target.tag_name().name(),
                    tag
                );
                Ok(None)
            }
            _ => Ok(Some(target)),
        }
    }

    fn reference_base_package(&self, base: Node<'_, '_>, reference: &str, base_name: Option<&str>) -> Result<&str> {
        let mut prefix = self.path_of(base).unwrap_or("");

        loop {
            let may_declare_bases = match self.node(prefix) {
                Some(node) => self.is_tag(node, "AR-PACKAGE"),
                None => true,
            };

            if may_declare_bases {
                let found = match base_name {
                    Some(name) => self.reference_base(prefix, name),
                    None => self.default_reference_base(prefix),
                };
                if let Some(package) = found {
                    return Ok(package);
                }
            }

            match prefix.rfind('/') {
                Some(pos) => prefix = &prefix[..pos],
                None => break,
            }
        }

        Err(ArxmlError::UnresolvedReferenceBase {
            base: base_name.map(str::to_string),
            reference: reference.to_string(),
        })
    }
}
