//! Output assembly.
//!
//! Joins the rendered body with the references section, and optionally wraps
//! the result in a complete HTML page.

use html_escape::encode_text;

/// Generates the final output from the rendered body and references.
///
/// # Arguments
///
/// * `body` - The rendered document HTML
/// * `references` - The rendered references list (if any)
/// * `header` - Text of the heading placed above the references
///
/// # Returns
///
/// The complete HTML fragment.
pub fn generate_output(body: &str, references: Option<&str>, header: &str) -> String {
    let mut output = body.trim_end().to_string();

    if let Some(refs) = references {
        if !refs.is_empty() {
            if !output.is_empty() {
                output.push_str("\n\n");
            }
            output.push_str("<h2 class=\"references-header\">");
            output.push_str(&encode_text(header));
            output.push_str("</h2>\n");
            output.push_str(refs.trim_end());
        }
    }

    output.push('\n');
    output
}

/// Wraps an HTML fragment in a minimal HTML5 page.
pub fn standalone_page(content: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        encode_text(title),
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_output_no_references() {
        let result = generate_output("<p>Some text</p>\n", None, "Sources");
        assert_eq!(result, "<p>Some text</p>\n");
    }

    #[test]
    fn test_generate_output_with_references() {
        // Given: a body and a references list
        let refs = "<ol class=\"references\">\n<li id=\"ref-1\">x</li>\n</ol>\n";

        // When: we assemble the output
        let result = generate_output("<p>a [1]</p>\n", Some(refs), "Sources");

        // Then: the header sits between body and list
        assert_eq!(
            result,
            "<p>a [1]</p>\n\n<h2 class=\"references-header\">Sources</h2>\n\
             <ol class=\"references\">\n<li id=\"ref-1\">x</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_generate_output_empty_references_ignored() {
        let result = generate_output("<p>x</p>", Some(""), "Sources");
        assert_eq!(result, "<p>x</p>\n");
    }

    #[test]
    fn test_header_is_escaped() {
        let result = generate_output("", Some("<ol></ol>"), "Q&A");
        assert_eq!(
            result,
            "<h2 class=\"references-header\">Q&amp;A</h2>\n<ol></ol>\n"
        );
    }

    #[test]
    fn test_standalone_page() {
        let page = standalone_page("<p>x</p>\n", "a <b>");
        assert!(page.starts_with("<!DOCTYPE html>\n"));
        assert!(page.contains("<title>a &lt;b&gt;</title>"));
        assert!(page.contains("<body>\n<p>x</p>\n</body>"));
    }
}
