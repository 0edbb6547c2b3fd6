//! Path-based child lookup
//!
//! A location path is a list of [`PathAtom`]s. Each atom names a child tag;
//! atoms that permit references also match `<TAG>-REF` children, which are
//! followed to their target, and multi-valued atoms may match any number of
//! children per base element.

use crate::arxml::index::ReferenceIndex;
use crate::arxml::xml;
use crate::types::{ArxmlError, Result};
use roxmltree::Node;
use std::fmt;

/// One step of a location path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAtom {
    pub tag: &'static str,
    /// `<tag>-REF` children are followed as well
    pub reference_permitted: bool,
    /// More than one match per base element is allowed
    pub multi_valued: bool,
}

impl PathAtom {
    pub const fn one(tag: &'static str) -> Self {
        Self {
            tag,
            reference_permitted: false,
            multi_valued: false,
        }
    }

    pub const fn one_ref(tag: &'static str) -> Self {
        Self {
            tag,
            reference_permitted: true,
            multi_valued: false,
        }
    }

    pub const fn many(tag: &'static str) -> Self {
        Self {
            tag,
            reference_permitted: false,
            multi_valued: true,
        }
    }

    pub const fn many_ref(tag: &'static str) -> Self {
        Self {
            tag,
            reference_permitted: true,
            multi_valued: true,
        }
    }
}

impl fmt::Display for PathAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multi_valued {
            write!(f, "*")?;
        }
        if self.reference_permitted {
            write!(f, "&")?;
        }
        write!(f, "{}", self.tag)
    }
}

/// Render a location path for error messages
pub fn describe(path: &[PathAtom]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Evaluates location paths against the document of a [`ReferenceIndex`]
#[derive(Clone, Copy)]
pub struct ChildLocator<'i, 'a, 'input> {
    index: &'i ReferenceIndex<'a, 'input>,
}

impl<'i, 'a, 'input> ChildLocator<'i, 'a, 'input> {
    pub fn new(index: &'i ReferenceIndex<'a, 'input>) -> Self {
        Self { index }
    }

    /// All elements reached from `bases` along `path`, in document order of
    /// the bases and their children
    pub fn children(&self, bases: &[Node<'a, 'input>], path: &[PathAtom]) -> Result<Vec<Node<'a, 'input>>> {
        let mut current = bases.to_vec();

        for atom in path {
            if current.is_empty() {
                break;
            }

            let reference_tag = atom.reference_permitted.then(|| format!("{}-REF", atom.tag));
            let mut next = Vec::new();

            for base in &current {
                let mut matches = 0usize;
                for child in base.children().filter(|c| c.is_element()) {
                    if self.index.is_tag(child, atom.tag) {
                        next.push(child);
                        matches += 1;
                    } else if let Some(reference_tag) = &reference_tag {
                        if self.index.is_tag(child, reference_tag) {
                            next.push(self.follow(*base, child)?);
                            matches += 1;
                        }
                    }
                }

                if !atom.multi_valued && matches > 1 {
                    return Err(ArxmlError::AmbiguousStructure(format!(
                        "encountered a non-unique child node of type {} which ought to be unique (below '{}')",
                        atom.tag,
                        self.index.path_of(*base).unwrap_or("")
                    )));
                }
            }

            current = next;
        }

        Ok(current)
    }

    /// The single element reached from `base` along `path`, if any
    pub fn unique(&self, base: Node<'a, 'input>, path: &[PathAtom]) -> Result<Option<Node<'a, 'input>>> {
        let mut found = self.children(&[base], path)?;
        match found.len() {
            0 | 1 => Ok(found.pop()),
            _ => Err(ArxmlError::AmbiguousStructure(format!(
                "{} does not resolve into a unique node (below '{}')",
                describe(path),
                self.index.path_of(base).unwrap_or("")
            ))),
        }
    }

    /// Trimmed text of [`ChildLocator::unique`]
    pub fn unique_text(&self, base: Node<'a, 'input>, path: &[PathAtom]) -> Result<Option<&'a str>> {
        Ok(self.unique(base, path)?.map(xml::text))
    }

    /// Like [`ChildLocator::unique_text`], but absence is an error
    pub fn require_text(&self, base: Node<'a, 'input>, path: &[PathAtom]) -> Result<&'a str> {
        self.unique_text(base, path)?.ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "{} below '{}'",
                describe(path),
                self.index.path_of(base).unwrap_or("")
            ))
        })
    }

    /// `SHORT-NAME` of an element, which must be present
    pub fn short_name(&self, node: Node<'a, 'input>) -> Result<&'a str> {
        xml::short_name(node, self.index.namespace()).ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "SHORT-NAME of {} below '{}'",
                node.tag_name().name(),
                self.index.path_of(node).unwrap_or("")
            ))
        })
    }

    fn follow(&self, base: Node<'a, 'input>, reference: Node<'a, 'input>) -> Result<Node<'a, 'input>> {
        let text = xml::text(reference);
        let dest = reference.attribute("DEST");
        self.index
            .resolve(base, text, dest, reference.attribute("BASE"))?
            .ok_or_else(|| ArxmlError::DanglingReference {
                reference: text.to_string(),
                dest: dest.map(str::to_string),
            })
    }
}
