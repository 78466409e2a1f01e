// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Minimal mutable XML tree for resource and manifest documents.
//!
//! ```text
//! bytes --decode_document--> text --quick_xml::Reader--> Document
//!                                                          |
//!   prolog (decl, comments)   root: Element   epilog      |
//!                               |                          |
//!                     children: Element | Raw(Event)       |
//!                                                          v
//! bytes <--TextEncoding::encode-- text <--quick_xml::Writer-+
//! ```
//!
//! Attribute values and text are kept in their escaped source form, so a
//! document that is loaded and saved without edits comes back unchanged
//! apart from quoting style.

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{FatAarResult, FsError, XmlError};
use crate::utility::encoding::{TextEncoding, decode_document};
use crate::utility::fs::atomic::write_atomic;

/// A node inside an element.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Text, comments, CDATA and processing instructions, kept verbatim.
    Raw(Event<'static>),
}

impl Node {
    fn is_blank_text(&self) -> bool {
        matches!(self, Self::Raw(Event::Text(text)) if text.iter().all(u8::is_ascii_whitespace))
    }
}

/// An element with its attributes in source order.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Qualified name, including any prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Unescaped value of the attribute with qualified name `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        self.raw_attr(name).map(unescape_or_raw)
    }

    /// Escaped source value of the attribute with qualified name `name`.
    #[must_use]
    pub fn raw_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute names and escaped values in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets an attribute, escaping `value`.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = quick_xml::escape::escape(value).into_owned();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = escaped,
            None => self.attributes.push((name.to_string(), escaped)),
        }
    }

    /// Removes every attribute matching `predicate`; returns how many went.
    pub fn remove_attrs_where(&mut self, mut predicate: impl FnMut(&str) -> bool) -> usize {
        let before = self.attributes.len();
        self.attributes.retain(|(key, _)| !predicate(key));
        before - self.attributes.len()
    }

    /// Removes the attribute `name`; returns whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        self.remove_attrs_where(|key| key == name) > 0
    }

    /// All child nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Raw(_) => None,
        })
    }

    /// Mutable child elements in document order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Raw(_) => None,
        })
    }

    /// First child element with the given local name.
    #[must_use]
    pub fn find(&self, local_name: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local_name)
    }

    /// First child element with the given local name, mutably.
    pub fn find_mut(&mut self, local_name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local_name)
    }

    /// Removes the child elements for which `remove` returns true.
    ///
    /// `remove` sees the element and its position among child elements.
    /// The whitespace text directly before a removed element is dropped with
    /// it so the remaining layout stays tidy. Returns the removed elements
    /// in document order.
    pub fn remove_elements_where(
        &mut self,
        mut remove: impl FnMut(usize, &Element) -> bool,
    ) -> Vec<Element> {
        let mut removed = Vec::new();
        let mut kept: Vec<Node> = Vec::with_capacity(self.children.len());
        let mut position = 0;

        for node in std::mem::take(&mut self.children) {
            match node {
                Node::Element(element) => {
                    let drop_it = remove(position, &element);
                    position += 1;
                    if drop_it {
                        if kept.last().is_some_and(Node::is_blank_text) {
                            kept.pop();
                        }
                        removed.push(element);
                    } else {
                        kept.push(Node::Element(element));
                    }
                }
                raw @ Node::Raw(_) => kept.push(raw),
            }
        }

        self.children = kept;
        removed
    }

    /// Appends a child element on its own line, indented by `indent`.
    pub fn push_element(&mut self, element: Element, indent: &str) {
        let trailing = match self.children.last() {
            Some(node) if node.is_blank_text() => self.children.pop(),
            _ => None,
        };
        self.children
            .push(Node::Raw(Event::Text(BytesText::from_escaped(format!("\n{indent}")))));
        self.children.push(Node::Element(element));
        self.children.push(
            trailing.unwrap_or_else(|| Node::Raw(Event::Text(BytesText::from_escaped("\n")))),
        );
        self.self_closing = false;
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> std::io::Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            let value: Cow<'_, str> = if value.contains('"') {
                Cow::Owned(value.replace('"', "&quot;"))
            } else {
                Cow::Borrowed(value)
            };
            start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
        }

        if self.children.is_empty() && self.self_closing {
            return writer.write_event(Event::Empty(start));
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(writer)?,
                Node::Raw(event) => writer.write_event(event.borrow())?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    prolog: Vec<Event<'static>>,
    root: Element,
    epilog: Vec<Event<'static>>,
    encoding: TextEncoding,
}

impl Document {
    /// Creates a document with an XML declaration and an empty root.
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut root = Element::new(name);
        root.self_closing = false;
        root.children
            .push(Node::Raw(Event::Text(BytesText::from_escaped("\n"))));
        Self {
            prolog: vec![
                Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
                Event::Text(BytesText::from_escaped("\n")),
            ],
            root,
            epilog: vec![Event::Text(BytesText::from_escaped("\n"))],
            encoding: TextEncoding::default(),
        }
    }

    /// Parses `bytes`; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::Parse` for malformed input and `XmlError::NoRoot`
    /// when the document has no element.
    pub fn parse(bytes: &[u8], path: &Path) -> FatAarResult<Self> {
        let (text, encoding) = decode_document(bytes);
        let mut reader = Reader::from_str(&text);
        reader.config_mut().trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                XmlError::parse(
                    path,
                    format!("{e} at byte {}", reader.error_position()),
                )
            })?;

            match event {
                Event::Eof => break,
                Event::Start(start) => stack.push(element_from_start(&start, false, path)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, true, path)?;
                    attach(element, &mut stack, &mut root, path)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::parse(path, "unbalanced end tag"))?;
                    attach(element, &mut stack, &mut root, path)?;
                }
                other => {
                    let owned = other.into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Raw(owned)),
                        None if root.is_none() => prolog.push(owned),
                        None => epilog.push(owned),
                    }
                }
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::parse(path, "unexpected end of document").into());
        }
        let root = root.ok_or_else(|| XmlError::NoRoot {
            path: path.display().to_string(),
        })?;

        Ok(Self {
            prolog,
            root,
            epilog,
            encoding,
        })
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an `FsError` when the file cannot be read, otherwise the
    /// errors of [`Document::parse`].
    pub fn load(path: &Path) -> FatAarResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| FsError::io(path, e))?;
        Self::parse(&bytes, path)
    }

    /// Root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Root element, mutably.
    pub const fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Encoding the document was read with and will be written in.
    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Serializes the document to text.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::Write` if serialization fails.
    pub fn to_xml_string(&self) -> FatAarResult<String> {
        self.render(Path::new("<memory>"))
    }

    fn render(&self, path: &Path) -> FatAarResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)
            .map_err(|e| XmlError::write(path, e))?;
        Ok(String::from_utf8(writer.into_inner()).map_err(|e| XmlError::write(path, e))?)
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> std::io::Result<()> {
        for event in &self.prolog {
            writer.write_event(event.borrow())?;
        }
        self.root.write_to(writer)?;
        for event in &self.epilog {
            writer.write_event(event.borrow())?;
        }
        Ok(())
    }

    /// Writes the document to `path` in its original encoding, replacing
    /// the file atomically.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::Write` or an `FsError` on failure.
    pub fn save(&self, path: &Path) -> FatAarResult<()> {
        let text = self.render(path)?;
        write_atomic(path, &self.encoding.encode(&text))
    }
}

/// Splits `prefix:local` into its parts.
#[must_use]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn unescape_or_raw(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

fn element_from_start(start: &BytesStart<'_>, empty: bool, path: &Path) -> FatAarResult<Element> {
    let name = String::from_utf8(start.name().as_ref().to_vec())
        .map_err(|e| XmlError::parse(path, e))?;

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::parse(path, e))?;
        let key = String::from_utf8(attribute.key.as_ref().to_vec())
            .map_err(|e| XmlError::parse(path, e))?;
        let value =
            String::from_utf8(attribute.value.into_owned()).map_err(|e| XmlError::parse(path, e))?;
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing: empty,
    })
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    path: &Path,
) -> FatAarResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::parse(path, "multiple root elements").into()),
    }
}

#[cfg(test)]
mod tests;
