//! Ordered XML element trees for connectors that speak hand-shaped XML
//!
//! Connectors whose documents depend on runtime choices (optional blocks,
//! element order that changes per operation) build an [`XmlElement`] tree
//! instead of deriving serde structs. The same type is produced when a
//! response document is parsed back.

use error_stack::{report, ResultExt};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::errors::{CustomResult, ParsingError};

/// Content of an element. An element holds either text or child elements, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Text(String),
    Children(Vec<XmlElement>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    content: XmlContent,
}

impl XmlElement {
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: XmlContent::Text(text.into()),
        }
    }

    pub fn container(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: XmlContent::Children(children),
        }
    }

    /// Append an attribute; attributes are written in the order they were added.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn content(&self) -> &XmlContent {
        &self.content
    }

    /// Text of a leaf element, `None` for containers
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            XmlContent::Text(text) => Some(text.as_str()),
            XmlContent::Children(_) => None,
        }
    }

    /// Child elements in document order; empty for leaves
    pub fn children(&self) -> &[Self] {
        match &self.content {
            XmlContent::Text(_) => &[],
            XmlContent::Children(children) => children.as_slice(),
        }
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children().iter().find(|child| child.name == name)
    }

    /// Copy of the tree with the text of every leaf named in `names` replaced by `mask`.
    pub fn with_masked_leaves(&self, names: &[&str], mask: &str) -> Self {
        let content = match &self.content {
            XmlContent::Text(_) if names.contains(&self.name.as_str()) => {
                XmlContent::Text(mask.to_string())
            }
            XmlContent::Text(text) => XmlContent::Text(text.clone()),
            XmlContent::Children(children) => XmlContent::Children(
                children
                    .iter()
                    .map(|child| child.with_masked_leaves(names, mask))
                    .collect(),
            ),
        };
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            content,
        }
    }

    /// Serialize the tree as a UTF-8 document, declaration included, indented by two spaces.
    pub fn to_document(&self) -> CustomResult<String, ParsingError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .change_context(ParsingError::EncodeError("xml"))?;
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .change_context(ParsingError::EncodeError("xml"))
            .attach_printable("xml writer produced invalid utf-8")
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> CustomResult<(), ParsingError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer
            .write_event(Event::Start(start))
            .change_context(ParsingError::EncodeError("xml"))?;
        match &self.content {
            XmlContent::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .change_context(ParsingError::EncodeError("xml"))?,
            XmlContent::Children(children) => {
                for child in children {
                    child.write_to(writer)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .change_context(ParsingError::EncodeError("xml"))
            .attach_printable_lazy(|| format!("failed to close element `{}`", self.name))
    }

    /// Parse a document into a tree.
    ///
    /// Surrounding whitespace is trimmed. Elements with child elements become
    /// containers and any text next to those children is dropped; every other
    /// element becomes a leaf, with empty text when it has none.
    pub fn parse(document: &str) -> CustomResult<Self, ParsingError> {
        let mut reader = Reader::from_str(document);
        reader.trim_text(true);

        let mut open: Vec<PartialElement> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            let event = reader
                .read_event()
                .change_context(ParsingError::XmlParsingError)
                .attach_printable_lazy(|| {
                    format!("malformed xml near byte {}", reader.buffer_position())
                })?;
            match event {
                Event::Start(start) => open.push(PartialElement::from_start(&start)?),
                Event::Empty(start) => {
                    let element = PartialElement::from_start(&start)?.finish();
                    attach(element, &mut open, &mut root)?;
                }
                Event::Text(text) => {
                    if let Some(current) = open.last_mut() {
                        let unescaped = text
                            .unescape()
                            .change_context(ParsingError::XmlParsingError)?;
                        current.text.push_str(&unescaped);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(current) = open.last_mut() {
                        let raw = String::from_utf8(cdata.into_inner().into_owned())
                            .change_context(ParsingError::XmlParsingError)?;
                        current.text.push_str(&raw);
                    }
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| report!(ParsingError::XmlParsingError))
                        .attach_printable("closing tag without an open element")?
                        .finish();
                    attach(element, &mut open, &mut root)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(report!(ParsingError::XmlParsingError))
                .attach_printable("document ended with unclosed elements");
        }
        root.ok_or_else(|| report!(ParsingError::MissingRootElement))
    }
}

struct PartialElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl PartialElement {
    fn from_start(start: &BytesStart<'_>) -> CustomResult<Self, ParsingError> {
        let name = String::from_utf8(start.name().as_ref().to_vec())
            .change_context(ParsingError::XmlParsingError)?;
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.change_context(ParsingError::XmlParsingError)?;
            let key = String::from_utf8(attribute.key.as_ref().to_vec())
                .change_context(ParsingError::XmlParsingError)?;
            let value = attribute
                .unescape_value()
                .change_context(ParsingError::XmlParsingError)?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    fn finish(self) -> XmlElement {
        let content = if self.children.is_empty() {
            XmlContent::Text(self.text)
        } else {
            XmlContent::Children(self.children)
        };
        XmlElement {
            name: self.name,
            attributes: self.attributes,
            content,
        }
    }
}

fn attach(
    element: XmlElement,
    open: &mut [PartialElement],
    root: &mut Option<XmlElement>,
) -> CustomResult<(), ParsingError> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(report!(ParsingError::XmlParsingError))
            .attach_printable("document has more than one root element"),
    }
}
