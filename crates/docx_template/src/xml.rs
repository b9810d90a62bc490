//! Owned XML tree for OOXML parts
//!
//! Word parts are parsed into a small element tree so content controls can
//! be located, deep-copied and spliced back. Parsing is driven by quick-xml
//! events; serialisation writes the tree back as a string.
//!
//! Whitespace is never trimmed: `w:t` runs with `xml:space="preserve"` must
//! survive a round trip byte-for-byte in their text content.

use crate::error::{DocxError, DocxResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node in the XML tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction content, without the `<?` and `?>` delimiters
    ProcessingInstruction(String),
    /// Document type declaration content, without `<!DOCTYPE` and `>`
    DocType(String),
}

impl XmlNode {
    /// Borrow the element if this node is one
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutably borrow the element if this node is one
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    fn write(&self, out: &mut String) {
        match self {
            XmlNode::Element(el) => el.write(out),
            XmlNode::Text(text) => out.push_str(&escape_text(text)),
            XmlNode::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            XmlNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            XmlNode::ProcessingInstruction(content) => {
                out.push_str("<?");
                out.push_str(content);
                out.push_str("?>");
            }
            XmlNode::DocType(content) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(content);
                out.push('>');
            }
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(el: XmlElement) -> Self {
        XmlNode::Element(el)
    }
}

/// An element with its qualified name, attributes in source order and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name including prefix (e.g. `w:sdt`)
    pub name: String,
    /// Attributes as (qualified name, unescaped value)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: add a child node
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: add a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    fn from_start(start: &BytesStart) -> DocxResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| DocxError::XmlParse(format!("Bad attribute value on {}: {}", name, e)))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    /// Check if the element name matches with optional namespace prefix
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Get an attribute by its qualified name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get a w: namespaced attribute, falling back to the bare name
    pub fn w_attr(&self, local: &str) -> Option<&str> {
        let prefixed = format!("w:{}", local);
        self.attr(&prefixed).or_else(|| self.attr(local))
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Direct element children
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Direct element children, mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First direct child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(local))
    }

    /// First direct child element with the given local name, mutably
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.is(local))
    }

    /// Whether a direct child element with the given local name exists
    pub fn has_child(&self, local: &str) -> bool {
        self.child(local).is_some()
    }

    /// Index of the first direct child element with the given local name
    pub fn position_of(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| node.as_element().is_some_and(|el| el.is(local)))
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a XmlElement>) {
        for el in self.elements() {
            out.push(el);
            el.collect_descendants(out);
        }
    }

    /// Whether any descendant has the given local name
    pub fn contains(&self, local: &str) -> bool {
        self.elements().any(|el| el.is(local) || el.contains(local))
    }

    /// First descendant (pre-order) with the given local name, mutably
    pub fn find_descendant_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        for el in self.elements_mut() {
            if el.is(local) {
                return Some(el);
            }
            if let Some(found) = el.find_descendant_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// Remove direct children matching `pred`, returning how many were removed
    pub fn remove_children_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&XmlNode) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|node| !pred(node));
        before - self.children.len()
    }

    /// Visible text of the element: `w:t` content, `w:tab` as tab, `w:br` as newline
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            if let XmlNode::Element(el) = node {
                if el.is("t") {
                    for child in &el.children {
                        if let XmlNode::Text(text) = child {
                            out.push_str(text);
                        }
                    }
                } else if el.is("tab") {
                    out.push('\t');
                } else if el.is("br") || el.is("cr") {
                    out.push('\n');
                } else {
                    el.collect_text(out);
                }
            }
        }
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialise this element alone
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }
}

/// A parsed XML part: declaration, prolog and root element
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// The original XML declaration, verbatim (e.g. `<?xml version="1.0" ...?>`)
    pub declaration: Option<String>,
    /// Whitespace, comments, processing instructions and doctype between
    /// the declaration and the root element
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    /// Nodes after the root element
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse an XML part
    pub fn parse(xml: &str) -> DocxResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                DocxError::XmlParse(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Decl(ref decl) => {
                    let raw: &[u8] = decl;
                    declaration = Some(format!("<?{}?>", String::from_utf8_lossy(raw)));
                }
                Event::Start(ref e) => {
                    stack.push(XmlElement::from_start(e)?);
                }
                Event::Empty(ref e) => {
                    let el = XmlElement::from_start(e)?;
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::Element(el))?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        DocxError::XmlParse("Unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::Element(el))?;
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?.into_owned();
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::Text(text))?;
                }
                Event::CData(ref e) => {
                    let raw: &[u8] = e;
                    let text = String::from_utf8_lossy(raw).into_owned();
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::CData(text))?;
                }
                Event::Comment(ref e) => {
                    let raw: &[u8] = e;
                    let text = String::from_utf8_lossy(raw).into_owned();
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::Comment(text))?;
                }
                Event::PI(ref e) => {
                    let raw: &[u8] = e;
                    let content = String::from_utf8_lossy(raw).into_owned();
                    attach(
                        &mut stack,
                        &mut root,
                        &mut prolog,
                        &mut epilog,
                        XmlNode::ProcessingInstruction(content),
                    )?;
                }
                Event::DocType(ref e) => {
                    let raw: &[u8] = e;
                    let content = String::from_utf8_lossy(raw).trim().to_string();
                    attach(&mut stack, &mut root, &mut prolog, &mut epilog, XmlNode::DocType(content))?;
                }
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(DocxError::XmlParse(format!(
                "Unclosed element <{}>",
                stack.last().map(|el| el.name.as_str()).unwrap_or_default()
            )));
        }

        let root = root.ok_or_else(|| DocxError::XmlParse("Document has no root element".to_string()))?;
        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialise the document, re-emitting the original declaration and
    /// the whitespace around the root element
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(ref decl) = self.declaration {
            out.push_str(decl);
        }
        for node in &self.prolog {
            node.write(&mut out);
        }
        self.root.write(&mut out);
        for node in &self.epilog {
            node.write(&mut out);
        }
        out
    }
}

/// Attach a finished node to the open parent, or make it the root
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
    node: XmlNode,
) -> DocxResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        XmlNode::Element(el) => {
            if root.is_some() {
                return Err(DocxError::XmlParse("Multiple root elements".to_string()));
            }
            *root = Some(el);
        }
        other if root.is_none() => prolog.push(other),
        other => epilog.push(other),
    }
    Ok(())
}

/// Escape XML special characters for attribute values
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape XML special characters for character data
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
