//! Document tree.
//!
//! A small markdown syntax tree shaped after mdast: text leaves, link nodes,
//! and everything else as opaque elements. The JSON form is mdast-compatible
//! so trees produced by another parser can be passed through the transforms.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum Node {
    /// Literal text. Always a leaf.
    Text {
        value: String,
        /// Attributes carried through untouched (e.g. `position`)
        extra: Map<String, Value>,
    },
    /// A hyperlink with inline children.
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
        extra: Map<String, Value>,
    },
    /// Any other block or inline node.
    Element {
        /// mdast node type (e.g. "paragraph", "emphasis", "code")
        kind: String,
        /// Remaining attributes (e.g. `depth`, `lang`, `value`)
        props: Map<String, Value>,
        /// `None` for leaf kinds such as `code` or `image`
        children: Option<Vec<Node>>,
    },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
            extra: Map::new(),
        }
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Link {
            url: url.into(),
            title: None,
            children,
            extra: Map::new(),
        }
    }

    /// A container element with the given children.
    pub fn element(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            kind: kind.into(),
            props: Map::new(),
            children: Some(children),
        }
    }

    /// A childless element whose content, if any, lives in its props.
    pub fn leaf(kind: impl Into<String>, props: Map<String, Value>) -> Self {
        Node::Element {
            kind: kind.into(),
            props,
            children: None,
        }
    }

    pub fn root(children: Vec<Node>) -> Self {
        Node::element("root", children)
    }

    /// The mdast type name of this node.
    pub fn kind(&self) -> &str {
        match self {
            Node::Text { .. } => "text",
            Node::Link { .. } => "link",
            Node::Element { kind, .. } => kind,
        }
    }

    /// Whether this node is a hyperlink, inline or reference-style.
    pub fn is_link(&self) -> bool {
        match self {
            Node::Link { .. } => true,
            Node::Element { kind, .. } => kind == "linkReference",
            Node::Text { .. } => false,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Text { .. } => None,
            Node::Link { children, .. } => Some(children),
            Node::Element { children, .. } => children.as_deref(),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Text { .. } => None,
            Node::Link { children, .. } => Some(children),
            Node::Element { children, .. } => children.as_mut(),
        }
    }

    /// Looks up a string attribute on an element.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { props, .. } => props.get(key).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Concatenates every text leaf at or below this node, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { value, .. } => out.push_str(value),
        _ => {
            for child in node.children().unwrap_or_default() {
                collect_text(child, out);
            }
        }
    }
}

/// Wire shape of a node: `{"type": ..., "value"?, "url"?, "children"?, ...}`.
#[derive(Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Node>>,
    #[serde(flatten)]
    props: Map<String, Value>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let RawNode {
            kind,
            value,
            url,
            children,
            mut props,
        } = raw;

        match kind.as_str() {
            // A missing or non-string value reads as empty text: no citations.
            "text" => Node::Text {
                value: match value {
                    Some(Value::String(s)) => s,
                    _ => String::new(),
                },
                extra: props,
            },
            "link" => {
                let title = match props.remove("title") {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                };
                Node::Link {
                    url: url.unwrap_or_default(),
                    title,
                    children: children.unwrap_or_default(),
                    extra: props,
                }
            }
            _ => {
                if let Some(value) = value {
                    props.insert("value".to_string(), value);
                }
                if let Some(url) = url {
                    props.insert("url".to_string(), Value::String(url));
                }
                Node::Element {
                    kind,
                    props,
                    children,
                }
            }
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Text { value, extra } => RawNode {
                kind: "text".to_string(),
                value: Some(Value::String(value)),
                url: None,
                children: None,
                props: extra,
            },
            Node::Link {
                url,
                title,
                children,
                mut extra,
            } => {
                if let Some(title) = title {
                    extra.insert("title".to_string(), Value::String(title));
                }
                RawNode {
                    kind: "link".to_string(),
                    value: None,
                    url: Some(url),
                    children: Some(children),
                    props: extra,
                }
            }
            Node::Element {
                kind,
                mut props,
                children,
            } => {
                let value = props.remove("value");
                let url = match props.remove("url") {
                    Some(Value::String(s)) => Some(s),
                    Some(other) => {
                        props.insert("url".to_string(), other);
                        None
                    }
                    None => None,
                };
                RawNode {
                    kind,
                    value,
                    url,
                    children,
                    props,
                }
            }
        }
    }
}
