//! Owned, editable XML tree for WordprocessingML parts
//!
//! Parsing goes through `roxmltree`; the tree is written back with
//! `quick_xml` escaping. Prefixes and namespace declarations are kept as
//! found so untouched markup round-trips unchanged.

use quick_xml::escape::escape;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Pi { target: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    /// Namespace declarations made on this element: (prefix, uri)
    pub declarations: Vec<(Option<String>, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// A new element in the same namespace (and prefix) as `self`
    pub fn sibling_kind(&self, name: &str) -> Element {
        Element {
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Shorthand for the WordprocessingML namespace
    pub fn is_w(&self, name: &str) -> bool {
        self.is(W_NS, name)
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.name)
    }

    pub fn attr(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    pub fn w_attr(&self, name: &str) -> Option<&str> {
        self.attr(W_NS, name)
    }

    pub fn set_attr(&mut self, prefix: Option<&str>, namespace: Option<&str>, name: &str, value: &str) {
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
        {
            existing.value = value.to_string();
            return;
        }
        self.attributes.push(Attribute {
            prefix: prefix.map(str::to_string),
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Set an attribute in this element's own namespace, e.g. `w:val`
    pub fn set_own_attr(&mut self, name: &str, value: &str) {
        let prefix = self.prefix.clone();
        let namespace = self.namespace.clone();
        self.set_attr(prefix.as_deref(), namespace.as_deref(), name, value);
    }

    pub fn remove_attr(&mut self, namespace: &str, name: &str) {
        self.attributes
            .retain(|a| !(a.name == name && a.namespace.as_deref() == Some(namespace)));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_w(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is_w(name))
    }

    pub fn child_w_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is_w(name))
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Concatenated character data of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, name),
        _ => name.to_string(),
    }
}

/// Parse an XML part into an owned tree rooted at its document element
pub fn parse(xml: &str) -> Result<Element, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;
    Ok(convert(doc.root_element()))
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let namespace = node.tag_name().namespace();
    let prefix = namespace.and_then(|uri| node.lookup_prefix(uri));

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let declarations = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NS)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    let attributes = node
        .attributes()
        .map(|a| {
            let prefix = match a.namespace() {
                Some(XML_NS) => Some("xml"),
                Some(uri) => node.lookup_prefix(uri),
                None => None,
            };
            Attribute {
                prefix: prefix.map(str::to_string),
                namespace: a.namespace().map(str::to_string),
                name: a.name().to_string(),
                value: a.value().to_string(),
            }
        })
        .collect();

    let children = node
        .children()
        .filter_map(|child| match child.node_type() {
            roxmltree::NodeType::Element => Some(Node::Element(convert(child))),
            roxmltree::NodeType::Text => child.text().map(|t| Node::Text(t.to_string())),
            roxmltree::NodeType::Comment => child.text().map(|t| Node::Comment(t.to_string())),
            roxmltree::NodeType::PI => child.pi().map(|pi| Node::Pi {
                target: pi.target.to_string(),
                value: pi.value.map(str::to_string),
            }),
            roxmltree::NodeType::Root => None,
        })
        .collect();

    Element {
        prefix: prefix.map(str::to_string),
        namespace: namespace.map(str::to_string),
        name: node.tag_name().name().to_string(),
        declarations,
        attributes,
        children,
    }
}

/// Serialize a tree as a standalone XML part
pub fn to_xml(root: &Element) -> String {
    let mut out = String::from(DECLARATION);
    write_element(root, &mut out);
    out
}

fn write_element(element: &Element, out: &mut String) {
    let name = element.qualified_name();
    out.push('<');
    out.push_str(&name);

    for (prefix, uri) in &element.declarations {
        match prefix {
            Some(p) => out.push_str(&format!(" xmlns:{}=\"{}\"", p, escape(uri.as_str()))),
            None => out.push_str(&format!(" xmlns=\"{}\"", escape(uri.as_str()))),
        }
    }

    for attr in &element.attributes {
        out.push_str(&format!(
            " {}=\"{}\"",
            qualify(attr.prefix.as_deref(), &attr.name),
            escape(attr.value.as_str())
        ));
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for child in &element.children {
        match child {
            Node::Element(e) => write_element(e, out),
            Node::Text(t) => out.push_str(&escape(t.as_str())),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            Node::Pi { target, value } => {
                out.push_str("<?");
                out.push_str(target);
                if let Some(v) = value {
                    out.push(' ');
                    out.push_str(v);
                }
                out.push_str("?>");
            }
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="urn:rels"><w:body><w:p><w:r><w:t xml:space="preserve">Tom &amp; Jerry </w:t></w:r></w:p><!-- note --></w:body></w:document>"#;

    #[test]
    fn test_parse_keeps_prefixes_and_namespaces() {
        let root = parse(SAMPLE).unwrap();
        assert!(root.is_w("document"));
        assert_eq!(root.qualified_name(), "w:document");
        assert_eq!(root.declarations.len(), 2);

        let body = root.child_w("body").unwrap();
        assert!(body.declarations.is_empty());
        assert_eq!(body.text(), "Tom & Jerry ");

        let t = body
            .child_w("p")
            .and_then(|p| p.child_w("r"))
            .and_then(|r| r.child_w("t"))
            .unwrap();
        assert_eq!(t.attr(XML_NS, "space"), Some("preserve"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let root = parse(SAMPLE).unwrap();
        let written = to_xml(&root);

        assert!(written.contains("<w:t xml:space=\"preserve\">Tom &amp; Jerry </w:t>"));
        assert!(written.contains("xmlns:w=\""));
        assert!(written.contains("<!-- note -->"));
        assert_eq!(parse(&written).unwrap(), root);
    }

    #[test]
    fn test_set_own_attr() {
        let mut root = parse(SAMPLE).unwrap();
        let mut jc = root.sibling_kind("jc");
        jc.set_own_attr("val", "center");
        jc.set_own_attr("val", "left");
        assert_eq!(jc.w_attr("val"), Some("left"));
        assert_eq!(jc.attributes.len(), 1);

        root.push(jc);
        assert!(to_xml(&root).contains("<w:jc w:val=\"left\"/>"));
    }
}
