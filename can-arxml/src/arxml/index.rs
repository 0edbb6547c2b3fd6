//! Path index over an ARXML document
//!
//! Every element that has a `SHORT-NAME` child is addressable through its
//! absolute path, the `/`-joined short names of itself and its named
//! ancestors. Elements without a short name share the path of their nearest
//! named ancestor. The index also records the reference bases each package
//! declares, which relative references are resolved against.

use crate::arxml::xml;
use crate::types::{ArxmlError, Result};
use roxmltree::{Document, Node, NodeId};
use std::collections::HashMap;

/// Bidirectional path ↔ element map plus per-package reference bases
pub struct ReferenceIndex<'a, 'input> {
    document: &'a Document<'input>,
    namespace: &'a str,
    path_to_node: HashMap<String, NodeId>,
    node_to_path: HashMap<NodeId, String>,
    /// package path → target package of its default reference base
    default_bases: HashMap<String, String>,
    /// package path → (short label → target package)
    reference_bases: HashMap<String, HashMap<String, String>>,
}

impl<'a, 'input> ReferenceIndex<'a, 'input> {
    /// Index every element of `document` whose tags live in `namespace`
    pub fn build(document: &'a Document<'input>, namespace: &'a str) -> Result<Self> {
        let mut index = Self {
            document,
            namespace,
            path_to_node: HashMap::new(),
            node_to_path: HashMap::new(),
            default_bases: HashMap::new(),
            reference_bases: HashMap::new(),
        };

        // (element, path of the enclosing named element, enclosing package path)
        let mut stack = vec![(document.root_element(), String::new(), String::new())];

        while let Some((element, parent_path, package_path)) = stack.pop() {
            let short_name = xml::short_name(element, namespace);

            let element_path = match short_name {
                Some(name) => {
                    let path = format!("{}/{}", parent_path, name);
                    if index.path_to_node.contains_key(&path) {
                        return Err(ArxmlError::DuplicatePath(path));
                    }
                    index.path_to_node.insert(path.clone(), element.id());
                    path
                }
                None => parent_path,
            };
            index.node_to_path.insert(element.id(), element_path.clone());

            let package_path = if index.is_tag(element, "AR-PACKAGE") {
                let name = short_name.filter(|n| !n.is_empty()).ok_or_else(|| {
                    ArxmlError::MalformedDocument(format!(
                        "AR-PACKAGE without SHORT-NAME below '{}'",
                        package_path
                    ))
                })?;
                format!("{}/{}", package_path, name)
            } else {
                package_path
            };

            if index.is_tag(element, "REFERENCE-BASE") {
                index.register_reference_base(element, &package_path)?;
            }

            // reversed so that children are visited in document order
            let children: Vec<Node<'a, 'input>> = element.children().filter(|c| c.is_element()).collect();
            for child in children.into_iter().rev() {
                stack.push((child, element_path.clone(), package_path.clone()));
            }
        }

        log::debug!(
            "Indexed {} named elements ({} packages with reference bases)",
            index.path_to_node.len(),
            index.reference_bases.len()
        );

        Ok(index)
    }

    fn register_reference_base(&mut self, element: Node<'a, 'input>, package_path: &str) -> Result<()> {
        let namespace = self.namespace;
        let required = |tag: &str| {
            xml::child(element, namespace, tag)
                .map(xml::text)
                .ok_or_else(|| {
                    ArxmlError::MalformedDocument(format!("REFERENCE-BASE without {} in package '{}'", tag, package_path))
                })
        };
        let label = required("SHORT-LABEL")?.to_string();
        let target = required("PACKAGE-REF")?.to_string();

        let flag = |tag: &str| {
            xml::child(element, namespace, tag)
                .map(|n| xml::text(n).eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        if flag("IS-GLOBAL") {
            return Err(ArxmlError::Unsupported(format!(
                "global reference base '{}' in package '{}'",
                label, package_path
            )));
        }

        if flag("IS-DEFAULT") {
            if self.default_bases.contains_key(package_path) {
                return Err(ArxmlError::MultipleDefaultReferenceBases(package_path.to_string()));
            }
            self.default_bases.insert(package_path.to_string(), target.clone());
        }

        let bases = self.reference_bases.entry(package_path.to_string()).or_default();
        if bases.contains_key(&label) {
            return Err(ArxmlError::DuplicateReferenceBase {
                package: package_path.to_string(),
                name: label,
            });
        }
        bases.insert(label, target);

        Ok(())
    }

    pub fn document(&self) -> &'a Document<'input> {
        self.document
    }

    /// Namespace all element tags are expected in
    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    /// Element registered under an absolute path
    pub fn node(&self, path: &str) -> Option<Node<'a, 'input>> {
        self.path_to_node
            .get(path)
            .and_then(|id| self.document.get_node(*id))
    }

    /// Absolute path of an element (the path of its nearest named ancestor
    /// if it has no short name itself)
    pub fn path_of(&self, node: Node<'_, '_>) -> Option<&str> {
        self.node_to_path.get(&node.id()).map(String::as_str)
    }

    /// All registered `(path, element)` pairs
    pub fn paths(&self) -> impl Iterator<Item = (&str, Node<'a, 'input>)> + '_ {
        self.path_to_node
            .iter()
            .filter_map(|(path, id)| self.document.get_node(*id).map(|n| (path.as_str(), n)))
    }

    /// Number of addressable elements
    pub fn len(&self) -> usize {
        self.path_to_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_to_node.is_empty()
    }

    /// True if `node` is an element named `tag` in the document namespace
    pub fn is_tag(&self, node: Node<'_, '_>, tag: &str) -> bool {
        xml::has_tag(node, self.namespace, tag)
    }

    /// Target package of the default reference base declared by `package`
    pub fn default_reference_base(&self, package: &str) -> Option<&str> {
        self.default_bases.get(package).map(String::as_str)
    }

    /// Target package of the reference base `name` declared by `package`
    pub fn reference_base(&self, package: &str, name: &str) -> Option<&str> {
        self.reference_bases
            .get(package)
            .and_then(|bases| bases.get(name))
            .map(String::as_str)
    }
}
