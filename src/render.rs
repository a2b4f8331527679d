//! HTML rendering.
//!
//! Serializes a document tree to HTML and builds the references list whose
//! entries carry the `id="ref-<n>"` anchors that citation links point at.

use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;
use serde_json::Value;

use crate::linker::ANCHOR_PREFIX;
use crate::markdown::cited_numbers;
use crate::refs::Source;
use crate::tree::Node;

/// Renders a tree as an HTML fragment.
///
/// Unknown node kinds render their children with no wrapping tag.
pub fn render_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_children(node: &Node, out: &mut String) {
    for child in node.children().unwrap_or_default() {
        write_node(child, out);
    }
}

fn write_wrapped(tag: &str, node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { value, .. } => out.push_str(&encode_text(value)),
        Node::Link { url, title, .. } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                out.push_str(&encode_double_quoted_attribute(title));
                out.push('"');
            }
            out.push('>');
            write_children(node, out);
            out.push_str("</a>");
        }
        Node::Element { kind, props, .. } => match kind.as_str() {
            "paragraph" => {
                write_wrapped("p", node, out);
                out.push('\n');
            }
            "heading" => {
                let depth = props
                    .get("depth")
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .clamp(1, 6);
                let tag = format!("h{}", depth);
                write_wrapped(&tag, node, out);
                out.push('\n');
            }
            "blockquote" => {
                out.push_str("<blockquote>\n");
                write_children(node, out);
                out.push_str("</blockquote>\n");
            }
            "list" => {
                let ordered = props.get("ordered").and_then(Value::as_bool).unwrap_or(false);
                if ordered {
                    match props.get("start").and_then(Value::as_u64) {
                        Some(start) if start != 1 => {
                            out.push_str(&format!("<ol start=\"{}\">\n", start))
                        }
                        _ => out.push_str("<ol>\n"),
                    }
                } else {
                    out.push_str("<ul>\n");
                }
                write_children(node, out);
                out.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            "listItem" => {
                out.push_str("<li>");
                if let Some(checked) = props.get("checked").and_then(Value::as_bool) {
                    out.push_str(if checked {
                        "<input type=\"checkbox\" checked disabled /> "
                    } else {
                        "<input type=\"checkbox\" disabled /> "
                    });
                }
                write_children(node, out);
                out.push_str("</li>\n");
            }
            "emphasis" => write_wrapped("em", node, out),
            "strong" => write_wrapped("strong", node, out),
            "delete" => write_wrapped("del", node, out),
            "inlineCode" => {
                out.push_str("<code>");
                out.push_str(&encode_text(node.prop_str("value").unwrap_or_default()));
                out.push_str("</code>");
            }
            "code" => {
                match node.prop_str("lang") {
                    Some(lang) => {
                        out.push_str("<pre><code class=\"language-");
                        out.push_str(&encode_double_quoted_attribute(lang));
                        out.push_str("\">");
                    }
                    None => out.push_str("<pre><code>"),
                }
                out.push_str(&encode_text(node.prop_str("value").unwrap_or_default()));
                out.push_str("</code></pre>\n");
            }
            "inlineMath" | "math" => {
                out.push_str("<span class=\"math\">");
                out.push_str(&encode_text(node.prop_str("value").unwrap_or_default()));
                out.push_str("</span>");
            }
            // Raw HTML from the source is passed through.
            "html" => out.push_str(node.prop_str("value").unwrap_or_default()),
            "break" => out.push_str("<br />\n"),
            "thematicBreak" => out.push_str("<hr />\n"),
            "image" => {
                out.push_str("<img src=\"");
                out.push_str(&encode_double_quoted_attribute(
                    node.prop_str("url").unwrap_or_default(),
                ));
                out.push_str("\" alt=\"");
                out.push_str(&encode_double_quoted_attribute(
                    node.prop_str("alt").unwrap_or_default(),
                ));
                out.push('"');
                if let Some(title) = node.prop_str("title") {
                    out.push_str(" title=\"");
                    out.push_str(&encode_double_quoted_attribute(title));
                    out.push('"');
                }
                out.push_str(" />");
            }
            "table" => {
                out.push_str("<table>\n");
                write_children(node, out);
                out.push_str("</table>\n");
            }
            "tableHead" => {
                out.push_str("<thead><tr>");
                for cell in node.children().unwrap_or_default() {
                    match cell.kind() {
                        "tableCell" => write_wrapped("th", cell, out),
                        _ => write_node(cell, out),
                    }
                }
                out.push_str("</tr></thead>\n");
            }
            "tableRow" => {
                out.push_str("<tr>");
                write_children(node, out);
                out.push_str("</tr>\n");
            }
            "tableCell" => write_wrapped("td", node, out),
            "footnoteReference" => {
                let id = node.prop_str("identifier").unwrap_or_default();
                out.push_str("<sup class=\"footnote-reference\"><a href=\"#fn-");
                out.push_str(&encode_double_quoted_attribute(id));
                out.push_str("\">");
                out.push_str(&encode_text(id));
                out.push_str("</a></sup>");
            }
            "footnoteDefinition" => {
                let id = node.prop_str("identifier").unwrap_or_default();
                out.push_str("<div class=\"footnote-definition\" id=\"fn-");
                out.push_str(&encode_double_quoted_attribute(id));
                out.push_str("\">\n");
                write_children(node, out);
                out.push_str("</div>\n");
            }
            _ => write_children(node, out),
        },
    }
}

/// Renders the references list for the citations in `markdown`.
///
/// The source text is scanned on its own, independently of any tree, and
/// each distinct cited number `n` gets one `<li id="ref-<n>">` entry in
/// order of first appearance, with `n` written exactly as in the text.
/// Number `n` refers to `sources[n - 1]`; an empty or absent slot renders
/// as "Source not available".
///
/// Returns `None` when the text cites nothing.
pub fn render_references(markdown: &str, sources: &[Option<Source>]) -> Option<String> {
    let numbers = cited_numbers(markdown);
    if numbers.is_empty() {
        return None;
    }

    let mut out = String::from("<ol class=\"references\">\n");
    for number in &numbers {
        let source = number
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| sources.get(index))
            .and_then(Option::as_ref);

        out.push_str("<li id=\"");
        out.push_str(ANCHOR_PREFIX);
        out.push_str(number);
        out.push_str("\">");
        match source {
            Some(source) => write_source(source, &mut out),
            None => {
                warn!("citation [{}] has no matching source", number);
                out.push_str("<span class=\"missing-source\">Source not available</span>");
            }
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ol>\n");

    Some(out)
}

fn write_source(source: &Source, out: &mut String) {
    out.push_str("<a href=\"");
    out.push_str(&encode_double_quoted_attribute(&source.url));
    out.push_str("\">");
    out.push_str(&encode_text(&source.title));
    out.push_str("</a>");
    if source.title != source.domain {
        out.push_str(" <span class=\"source-domain\">");
        out.push_str(&encode_text(&source.domain));
        out.push_str("</span>");
    }
    if source.is_official {
        out.push_str(" <span class=\"official-source\">Official</span>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::link_citations;
    use crate::markdown::parse_document;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        let mut tree = parse_document(markdown);
        link_citations(&mut tree);
        render_html(&tree)
    }

    #[test]
    fn test_render_paragraph_with_citation() {
        assert_eq!(
            render("see [12] for detail"),
            "<p>see <a href=\"#ref-12\">[12]</a> for detail</p>\n"
        );
    }

    #[test]
    fn test_render_escapes_text() {
        assert_eq!(render("a < b & c [1]"), "<p>a &lt; b &amp; c <a href=\"#ref-1\">[1]</a></p>\n");
    }

    #[test]
    fn test_render_heading_and_emphasis() {
        assert_eq!(
            render("## Costs *per hour* [2]"),
            "<h2>Costs <em>per hour</em> <a href=\"#ref-2\">[2]</a></h2>\n"
        );
    }

    #[test]
    fn test_render_authored_link_untouched() {
        assert_eq!(
            render("[see [3]](https://example.com)"),
            "<p><a href=\"https://example.com\">see [3]</a></p>\n"
        );
    }

    #[test]
    fn test_render_code_not_linked() {
        assert_eq!(
            render("`x[1]`\n\n```\ny[2]\n```\n"),
            "<p><code>x[1]</code></p>\n<pre><code>y[2]\n</code></pre>\n"
        );
    }

    #[test]
    fn test_render_lists() {
        assert_eq!(
            render("- one [1]\n- two\n"),
            "<ul>\n<li>one <a href=\"#ref-1\">[1]</a></li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(render("3. three\n"), "<ol start=\"3\">\n<li>three</li>\n</ol>\n");
    }

    #[test]
    fn test_render_unknown_kind_is_transparent() {
        let tree = Node::element("mystery", vec![Node::text("a"), Node::text("b")]);
        assert_eq!(render_html(&tree), "ab");
    }

    #[test]
    fn test_render_link_attributes_are_escaped() {
        let tree = Node::Link {
            url: "https://e.com/?a=1&b=\"2\"".to_string(),
            title: Some("T".to_string()),
            children: vec![Node::text("x")],
            extra: serde_json::Map::new(),
        };
        assert_eq!(
            render_html(&tree),
            "<a href=\"https://e.com/?a=1&amp;b=&quot;2&quot;\" title=\"T\">x</a>"
        );
    }

    #[test]
    fn test_references_none_without_citations() {
        assert_eq!(render_references("no citations here", &[]), None);
    }

    #[test]
    fn test_references_anchor_ids_match_link_targets() {
        // Given: text citing sources out of order, one of them twice
        let sources = vec![
            Some(Source::new("https://a.example/1", Some("First"), &[])),
            Some(Source::new("https://b.example/2", None, &[])),
        ];
        let markdown = "later [2], earlier [1], again [2]";

        // When: we render the references list
        let html = render_references(markdown, &sources).unwrap();

        // Then: one entry per distinct number, in first-appearance order
        assert_eq!(
            html,
            "<ol class=\"references\">\n\
             <li id=\"ref-2\"><a href=\"https://b.example/2\">b.example</a></li>\n\
             <li id=\"ref-1\"><a href=\"https://a.example/1\">First</a> \
             <span class=\"source-domain\">a.example</span></li>\n\
             </ol>\n"
        );
    }

    #[test]
    fn test_references_keep_verbatim_digits() {
        // "[01]" links to #ref-01, so the anchor must be ref-01 as well
        let sources = vec![Some(Source::new("https://a.example", None, &[]))];
        let html = render_references("x [01]", &sources).unwrap();
        assert!(html.contains("<li id=\"ref-01\"><a href=\"https://a.example\">"));
    }

    #[test]
    fn test_references_missing_source() {
        let html = render_references("[0] and [5]", &[]).unwrap();
        assert!(html.contains("<li id=\"ref-0\"><span class=\"missing-source\">"));
        assert!(html.contains("<li id=\"ref-5\"><span class=\"missing-source\">"));
    }

    #[test]
    fn test_references_empty_slot_keeps_numbering() {
        // Given: a list whose first entry had no url
        let sources = vec![None, Some(Source::new("https://b.example", None, &[]))];

        // When: both numbers are cited
        let html = render_references("[1] [2]", &sources).unwrap();

        // Then: the second source stays under ref-2
        assert_eq!(
            html,
            "<ol class=\"references\">\n\
             <li id=\"ref-1\"><span class=\"missing-source\">Source not available</span></li>\n\
             <li id=\"ref-2\"><a href=\"https://b.example\">b.example</a></li>\n\
             </ol>\n"
        );
    }

    #[test]
    fn test_render_table_header_cells() {
        assert_eq!(
            render("| A | B |\n|---|---|\n| x [1] | y |\n"),
            "<table>\n<thead><tr><th>A</th><th>B</th></tr></thead>\n\
             <tr><td>x <a href=\"#ref-1\">[1]</a></td><td>y</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn test_references_mark_official_sources() {
        let sources = vec![Some(Source::new(
            "https://www.ndis.gov.au/pricing",
            Some("Pricing"),
            &["ndis.gov.au".to_string()],
        ))];
        let html = render_references("[1]", &sources).unwrap();
        assert!(html.contains("<span class=\"official-source\">Official</span>"));
    }
}
