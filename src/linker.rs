//! Citation linking.
//!
//! Rewrites numeric bracket citations in text leaves into links pointing at
//! `#ref-<n>`. Text already inside a link is left alone.

use log::debug;

use crate::markdown::find_citation;
use crate::transform::Transform;
use crate::tree::Node;

/// Prefix of the anchor ids that citation links point at.
pub const ANCHOR_PREFIX: &str = "ref-";

/// Link target for a citation number, e.g. `#ref-12`.
pub fn citation_href(number: &str) -> String {
    format!("#{}{}", ANCHOR_PREFIX, number)
}

/// Splits a text value around its citations.
///
/// Returns `None` when the value holds no citation. Otherwise returns the
/// replacement nodes in order: the text before each citation (only if
/// non-empty), a link to `#ref-<n>` whose only child is the citation text
/// with its brackets, and any trailing text.
///
/// # Examples
///
/// ```
/// use citelink::{split_citations, Node};
///
/// let nodes = split_citations("see [12] for detail").unwrap();
/// assert_eq!(
///     nodes,
///     vec![
///         Node::text("see "),
///         Node::link("#ref-12", vec![Node::text("[12]")]),
///         Node::text(" for detail"),
///     ]
/// );
/// assert!(split_citations("no citations").is_none());
/// ```
pub fn split_citations(value: &str) -> Option<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    while let Some(citation) = find_citation(value, cursor) {
        let (start, end) = citation.span;
        if start > cursor {
            nodes.push(Node::text(&value[cursor..start]));
        }
        nodes.push(Node::link(
            citation_href(&citation.number),
            vec![Node::text(&value[start..end])],
        ));
        cursor = end;
    }

    if nodes.is_empty() {
        return None;
    }
    if cursor < value.len() {
        nodes.push(Node::text(&value[cursor..]));
    }
    Some(nodes)
}

/// Links every citation in the tree, in place.
///
/// Each original text leaf is inspected once; the nodes produced by
/// splitting it are never rescanned. Text below a link, at any depth, is
/// left untouched. A bare text node passed as `root` has no parent to splice
/// into and is left as is.
///
/// Returns the number of citation links created.
pub fn link_citations(root: &mut Node) -> usize {
    if root.is_link() {
        return 0;
    }
    match root.children_mut() {
        Some(children) => link_children(children),
        None => 0,
    }
}

fn link_children(children: &mut Vec<Node>) -> usize {
    let mut created = 0;
    let mut index = 0;

    while index < children.len() {
        if let Node::Text { value, .. } = &children[index] {
            if let Some(replacement) = split_citations(value) {
                let inserted = replacement.len();
                created += replacement.iter().filter(|node| node.is_link()).count();
                children.splice(index..index + 1, replacement);
                // Skip over what was just inserted.
                index += inserted;
                continue;
            }
        } else if !children[index].is_link() {
            if let Some(nested) = children[index].children_mut() {
                created += link_children(nested);
            }
        }
        index += 1;
    }

    created
}

/// The citation linking pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct CitationLinker;

impl CitationLinker {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for CitationLinker {
    fn name(&self) -> &str {
        "citation-linker"
    }

    fn apply(&self, tree: &mut Node) {
        let created = link_citations(tree);
        debug!("linked {} citation(s)", created);
    }
}
