//! Small helpers over roxmltree nodes

use roxmltree::Node;

/// True if `node` is an element named `tag` in `namespace`
pub(crate) fn has_tag(node: Node<'_, '_>, namespace: &str, tag: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == tag
        && node.tag_name().namespace().unwrap_or("") == namespace
}

/// First direct child element named `tag`
pub(crate) fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|c| has_tag(*c, namespace, tag))
}

/// Trimmed element text, empty for elements without text
pub(crate) fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Text of the direct `SHORT-NAME` child
pub(crate) fn short_name<'a>(node: Node<'a, '_>, namespace: &str) -> Option<&'a str> {
    child(node, namespace, "SHORT-NAME").map(text)
}
