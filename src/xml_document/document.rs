//! In-memory XML document
//!
//! A small element tree built on top of `quick-xml`, just enough to read
//! values out of legacy XML responses, add elements, and write the result
//! back out with indentation.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::warn;

/// Errors raised while reading or writing XML
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialized XML is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// A node inside an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Appends text, merging it into a directly preceding text node
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(XmlNode::Text(existing)) => existing.push_str(text),
            _ => self.children.push(XmlNode::Text(text.to_string())),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First element named `tag` below this one, depth first
    pub fn find_descendant(&self, tag: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == tag {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Text of the first child node, or an empty string if that node is not text
    pub fn text(&self) -> &str {
        match self.children.first() {
            Some(XmlNode::Text(text)) => text,
            _ => "",
        }
    }

    /// Appends `<name>value</name>` as the last child
    pub fn append_child(&mut self, name: &str, value: &str) {
        let mut child = XmlElement::new(name);
        child.push_text(value);
        self.children.push(XmlNode::Element(child));
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write(writer)?,
                XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;

        Ok(())
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parses a document, dropping whitespace-only text and merging adjacent
    /// text nodes
    pub fn parse(content: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(XmlElement::from_start(&start)?),
                Event::Empty(start) => {
                    let element = XmlElement::from_start(&start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    // quick-xml verifies that end tags match their start tags
                    if let Some(element) = stack.pop() {
                        close_element(element, &mut stack, &mut root)?;
                    }
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape().map_err(quick_xml::Error::from)?;
                        parent.push_text(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::UnclosedElement(open.name));
        }

        root.map(Self::new).ok_or(XmlError::NoRootElement)
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Text of the first element named `tag` anywhere in the document
    ///
    /// Returns an empty string when there is no such element or it has no
    /// text content.
    pub fn value_from_element(&self, tag: &str) -> &str {
        if self.root.name == tag {
            return self.root.text();
        }
        self.root
            .find_descendant(tag)
            .map(XmlElement::text)
            .unwrap_or("")
    }

    /// Serializes the document with two-space indentation and without an
    /// XML declaration
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.root.write(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Writes the indented document to `path`
    ///
    /// Failures are logged and reported as `false`.
    pub fn write_to_file(&self, path: &Path) -> bool {
        let result = self
            .to_xml_string()
            .and_then(|xml| fs::write(path, xml).map_err(XmlError::from));

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "error writing the document");
                false
            }
        }
    }
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Data>
  <Series>
    <id>79335</id>
    <SeriesName>Psych &amp; Friends</SeriesName>
    <Overview><![CDATA[Fake <psychic>]]></Overview>
    <banner/>
  </Series>
</Data>"#;

    #[test]
    fn test_value_from_element() {
        let doc = XmlDocument::parse(SERIES_XML).unwrap();
        assert_eq!(doc.value_from_element("id"), "79335");
        assert_eq!(doc.value_from_element("SeriesName"), "Psych & Friends");
        assert_eq!(doc.value_from_element("Overview"), "Fake <psychic>");
    }

    #[test]
    fn test_value_from_missing_or_empty_element_is_empty() {
        let doc = XmlDocument::parse(SERIES_XML).unwrap();
        assert_eq!(doc.value_from_element("banner"), "");
        assert_eq!(doc.value_from_element("FirstAired"), "");
        // the first child of <Series> is an element, not text
        assert_eq!(doc.value_from_element("Series"), "");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            XmlDocument::parse(""),
            Err(XmlError::NoRootElement)
        ));
        assert!(matches!(
            XmlDocument::parse("<a></a><b></b>"),
            Err(XmlError::MultipleRoots)
        ));
        assert!(XmlDocument::parse("<a><b></a>").is_err());
    }

    #[test]
    fn test_append_child_and_serialize() {
        let mut doc = XmlDocument::new(XmlElement::new("Data"));
        doc.root_mut().append_child("id", "42");
        doc.root_mut().append_child("title", "Tom & Jerry");

        let xml = doc.to_xml_string().unwrap();
        assert!(!xml.starts_with("<?xml"));
        assert_eq!(
            xml,
            "<Data>\n  <id>42</id>\n  <title>Tom &amp; Jerry</title>\n</Data>"
        );

        let reparsed = XmlDocument::parse(&xml).unwrap();
        assert_eq!(reparsed.value_from_element("title"), "Tom & Jerry");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.xml");

        let doc = XmlDocument::parse(SERIES_XML).unwrap();
        assert!(doc.write_to_file(&path));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(XmlDocument::parse(&written).unwrap(), doc);
    }

    #[test]
    fn test_write_to_unwritable_path_returns_false() {
        let doc = XmlDocument::new(XmlElement::new("Data"));
        assert!(!doc.write_to_file(Path::new("/nonexistent/dir/series.xml")));
    }
}
