//! Markdown citation scanning and parsing.
//!
//! Finds numeric bracket citations like `[1]` or `[23]` in text, and parses
//! Markdown into the [`Node`] tree the transforms operate on.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;
use serde_json::{Map, Value};

use crate::tree::Node;

/// Opening bracket, one or more ASCII digits, closing bracket.
pub const CITATION_PATTERN: &str = r"\[([0-9]+)\]";

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CITATION_PATTERN).expect("citation pattern is a valid regex"));

/// A numeric bracket citation found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// The digits between the brackets, verbatim (e.g. "07" stays "07")
    pub number: String,
    /// Start and end byte positions of the whole `[digits]` match
    pub span: (usize, usize),
}

impl Citation {
    /// The citation as written, brackets included.
    pub fn label(&self) -> String {
        format!("[{}]", self.number)
    }
}

/// Finds the first citation starting at or after byte offset `from`.
///
/// Returns `None` when there is no further match or `from` is past the end
/// of the text or not on a character boundary.
///
/// # Examples
///
/// ```
/// use citelink::find_citation;
///
/// let text = "see [1] and [22]";
/// let first = find_citation(text, 0).unwrap();
/// assert_eq!(first.number, "1");
/// let second = find_citation(text, first.span.1).unwrap();
/// assert_eq!(second.number, "22");
/// assert!(find_citation(text, second.span.1).is_none());
/// ```
pub fn find_citation(text: &str, from: usize) -> Option<Citation> {
    if from > text.len() || !text.is_char_boundary(from) {
        return None;
    }
    let cap = CITATION_RE.captures_at(text, from)?;
    let whole = cap.get(0)?;
    let digits = cap.get(1)?;
    Some(Citation {
        number: digits.as_str().to_string(),
        span: (whole.start(), whole.end()),
    })
}

/// Extracts all citations from the text, left to right, without overlap.
///
/// # Examples
///
/// ```
/// use citelink::extract_citations;
///
/// let citations = extract_citations("[1][2] but not [a] or []");
/// assert_eq!(citations.len(), 2);
/// assert_eq!(citations[1].span, (3, 6));
/// ```
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut citations = Vec::new();
    let mut cursor = 0;
    while let Some(citation) = find_citation(text, cursor) {
        cursor = citation.span.1;
        citations.push(citation);
    }
    citations
}

/// Distinct citation numbers in order of first appearance.
pub fn cited_numbers(text: &str) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for citation in extract_citations(text) {
        if !numbers.contains(&citation.number) {
            numbers.push(citation.number);
        }
    }
    numbers
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Parses Markdown into a `root` node.
///
/// Consecutive text events are merged into one text leaf, so a citation that
/// the parser emits in pieces (`[`, `12`, `]`) ends up in a single value.
/// Code, HTML and images are leaves; their content lives in props.
pub fn parse_document(markdown: &str) -> Node {
    let mut stack: Vec<Node> = vec![Node::root(Vec::new())];
    // Tags opened inside a leaf (formatting in image alt text) are flattened
    // into the leaf's props; this counts the ones still open.
    let mut flattened = 0usize;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(_) if is_open_leaf(&stack) => flattened += 1,
            Event::End(_) if flattened > 0 => flattened -= 1,
            Event::Start(tag) => stack.push(open_tag(tag)),
            Event::End(_) => {
                // The root is never closed by an event.
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        append_child(&mut stack, node);
                    }
                }
            }
            Event::Text(text) => push_text(&mut stack, &text),
            Event::SoftBreak => push_text(&mut stack, "\n"),
            Event::Code(code) => {
                if !accumulate_leaf(&mut stack, &code) {
                    append_child(&mut stack, valued_leaf("inlineCode", &code));
                }
            }
            Event::InlineMath(math) => {
                if !accumulate_leaf(&mut stack, &math) {
                    append_child(&mut stack, valued_leaf("inlineMath", &math));
                }
            }
            Event::DisplayMath(math) => append_child(&mut stack, valued_leaf("math", &math)),
            Event::Html(html) | Event::InlineHtml(html) => {
                if !accumulate_leaf(&mut stack, &html) {
                    append_child(&mut stack, valued_leaf("html", &html));
                }
            }
            Event::HardBreak => append_child(&mut stack, Node::leaf("break", Map::new())),
            Event::Rule => append_child(&mut stack, Node::leaf("thematicBreak", Map::new())),
            Event::FootnoteReference(label) => {
                let mut props = Map::new();
                props.insert("identifier".to_string(), Value::from(label.to_string()));
                append_child(&mut stack, Node::leaf("footnoteReference", props));
            }
            Event::TaskListMarker(checked) => {
                if let Some(Node::Element { kind, props, .. }) = stack.last_mut() {
                    if kind.as_str() == "listItem" {
                        props.insert("checked".to_string(), Value::Bool(checked));
                    }
                }
            }
            _ => {}
        }
    }

    // Unbalanced input cannot happen with pulldown-cmark, but fold anyway.
    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            append_child(&mut stack, node);
        }
    }
    stack.pop().unwrap_or_else(|| Node::root(Vec::new()))
}

fn open_tag(tag: Tag<'_>) -> Node {
    match tag {
        Tag::Paragraph => Node::element("paragraph", Vec::new()),
        Tag::Heading { level, .. } => {
            let mut props = Map::new();
            props.insert("depth".to_string(), Value::from(level as u8));
            container("heading", props)
        }
        Tag::BlockQuote(_) => Node::element("blockquote", Vec::new()),
        Tag::CodeBlock(kind) => {
            let mut props = Map::new();
            if let CodeBlockKind::Fenced(info) = kind {
                let lang = info.split_whitespace().next().unwrap_or_default();
                if !lang.is_empty() {
                    props.insert("lang".to_string(), Value::from(lang));
                }
            }
            props.insert("value".to_string(), Value::from(""));
            Node::leaf("code", props)
        }
        Tag::HtmlBlock => valued_leaf("html", ""),
        Tag::List(start) => {
            let mut props = Map::new();
            props.insert("ordered".to_string(), Value::Bool(start.is_some()));
            if let Some(start) = start {
                props.insert("start".to_string(), Value::from(start));
            }
            container("list", props)
        }
        Tag::Item => Node::element("listItem", Vec::new()),
        Tag::FootnoteDefinition(label) => {
            let mut props = Map::new();
            props.insert("identifier".to_string(), Value::from(label.to_string()));
            container("footnoteDefinition", props)
        }
        Tag::Table(_) => Node::element("table", Vec::new()),
        Tag::TableHead => Node::element("tableHead", Vec::new()),
        Tag::TableRow => Node::element("tableRow", Vec::new()),
        Tag::TableCell => Node::element("tableCell", Vec::new()),
        Tag::Emphasis => Node::element("emphasis", Vec::new()),
        Tag::Strong => Node::element("strong", Vec::new()),
        Tag::Strikethrough => Node::element("delete", Vec::new()),
        Tag::Link {
            dest_url, title, ..
        } => Node::Link {
            url: dest_url.to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
            children: Vec::new(),
            extra: Map::new(),
        },
        Tag::Image {
            dest_url, title, ..
        } => {
            let mut props = Map::new();
            props.insert("url".to_string(), Value::from(dest_url.to_string()));
            if !title.is_empty() {
                props.insert("title".to_string(), Value::from(title.to_string()));
            }
            props.insert("alt".to_string(), Value::from(""));
            Node::leaf("image", props)
        }
        _ => Node::element("container", Vec::new()),
    }
}

fn container(kind: &str, props: Map<String, Value>) -> Node {
    Node::Element {
        kind: kind.to_string(),
        props,
        children: Some(Vec::new()),
    }
}

fn valued_leaf(kind: &str, value: &str) -> Node {
    let mut props = Map::new();
    props.insert("value".to_string(), Value::from(value));
    Node::leaf(kind, props)
}

/// Appends `node` to the children of the innermost open container.
fn append_child(stack: &mut [Node], node: Node) {
    if let Some(children) = stack.last_mut().and_then(Node::children_mut) {
        children.push(node);
    }
}

fn is_open_leaf(stack: &[Node]) -> bool {
    matches!(stack.last(), Some(Node::Element { children: None, .. }))
}

/// Appends raw content to an open leaf (`code`, `html` or `image`).
///
/// Returns false when the innermost open node is not such a leaf.
fn accumulate_leaf(stack: &mut [Node], content: &str) -> bool {
    let Some(Node::Element {
        kind,
        props,
        children: None,
    }) = stack.last_mut()
    else {
        return false;
    };
    let key = if kind.as_str() == "image" { "alt" } else { "value" };
    let mut current = props
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    current.push_str(content);
    props.insert(key.to_string(), Value::String(current));
    true
}

fn push_text(stack: &mut [Node], text: &str) {
    if accumulate_leaf(stack, text) {
        return;
    }
    let Some(children) = stack.last_mut().and_then(Node::children_mut) else {
        return;
    };
    if let Some(Node::Text { value, .. }) = children.last_mut() {
        value.push_str(text);
    } else {
        children.push(Node::text(text));
    }
}
