//! citelink: link numeric bracket citations in Markdown documents.
//!
//! This library provides functionality to:
//! - Parse Markdown into an mdast-shaped document tree
//! - Rewrite `[n]` citations in text into links to `#ref-n`
//! - Load the numbered source list that citations refer to
//! - Render the tree and a references list with matching anchors as HTML

pub mod config;
pub mod linker;
pub mod markdown;
pub mod output;
pub mod refs;
pub mod render;
pub mod transform;
pub mod tree;

pub use config::Config;
pub use linker::{citation_href, link_citations, split_citations, CitationLinker, ANCHOR_PREFIX};
pub use markdown::{cited_numbers, extract_citations, find_citation, parse_document, Citation};
pub use output::{generate_output, standalone_page};
pub use refs::{load_sources, parse_sources, Source};
pub use render::{render_html, render_references};
pub use transform::{Pipeline, Transform};
pub use tree::Node;

/// Parses, links and renders a Markdown document in one go.
///
/// # Examples
///
/// ```
/// let html = citelink::render_markdown("Rates rose [1].");
/// assert_eq!(html, "<p>Rates rose <a href=\"#ref-1\">[1]</a>.</p>\n");
/// ```
pub fn render_markdown(markdown: &str) -> String {
    let mut tree = parse_document(markdown);
    Pipeline::default().apply(&mut tree);
    render_html(&tree)
}
