//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use citelink::Node;

/// A numbered source list as an answer API returns it.
pub const TEST_SOURCES: &str = r#"{
  "summary": "Support coordination rates",
  "citations": [
    {"url": "https://www.ndis.gov.au/pricing", "title": "Pricing Arrangements"},
    "https://www.example.org/blog/support-coordination",
    {"url": "https://www.dss.gov.au/disability", "title": "Disability services"}
  ]
}"#;

/// Markdown citing the sources above, with one citation inside an authored link.
pub const TEST_MARKDOWN: &str = "\
## Support coordination

Level 2 is priced per hour [1]. Providers often bill travel [2][3].

See [the guide [1]](https://www.ndis.gov.au/guide) for details.
";

/// The link node a citation `[n]` turns into.
pub fn cite(number: &str) -> Node {
    Node::link(
        format!("#ref-{}", number),
        vec![Node::text(format!("[{}]", number))],
    )
}

pub fn paragraph(children: Vec<Node>) -> Node {
    Node::element("paragraph", children)
}

/// Link targets of every link in the tree, in document order.
pub fn link_targets(node: &Node) -> Vec<String> {
    let mut targets = Vec::new();
    collect_targets(node, &mut targets);
    targets
}

fn collect_targets(node: &Node, targets: &mut Vec<String>) {
    if let Node::Link { url, .. } = node {
        targets.push(url.clone());
    }
    for child in node.children().unwrap_or_default() {
        collect_targets(child, targets);
    }
}
