//! Namespace-aware element tree over `quick-xml`.
//!
//! Elements carry their resolved namespace URI, never a prefix. The writer
//! puts element names in the default namespace (emitting `xmlns` only where
//! it changes) and picks prefixes for namespaced attributes from the
//! declarations in scope.

use crate::config::CodecConfig;
use crate::error::CodecError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const SERVICE_BUS_NS: &str = "http://schemas.microsoft.com/netservices/2010/10/servicebus/connect";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// An attribute with its resolved namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

/// A generic XML element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Extra `xmlns:prefix` declarations emitted on this element.
    pub declarations: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Leaf element holding `text`.
    pub fn text_element(namespace: &str, name: &str, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(namespace, name)
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            namespace: None,
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn with_namespaced_attribute(
        mut self,
        namespace: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn declare(mut self, prefix: &str, namespace: &str) -> Self {
        self.declarations
            .push((prefix.to_string(), namespace.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }

    /// First child with the given local name, in any namespace.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child with the given namespace and local name.
    pub fn child_ns(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace.as_deref() == Some(namespace))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Text content of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

/// Parse a document into its root element.
///
/// Returns `Ok(None)` for an empty (or whitespace-only) document.
pub fn parse_document(xml: &str) -> Result<Option<Element>, CodecError> {
    if xml.trim().is_empty() {
        return Ok(None);
    }

    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(CodecError::xml)?;
        let namespace = resolved_namespace(resolved)?;

        match event {
            Event::Start(start) => {
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, namespace, &start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::Xml("unbalanced end tag".into()))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&text.unescape().map_err(CodecError::xml)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let raw = data.into_inner();
                    current
                        .text
                        .push_str(std::str::from_utf8(&raw).map_err(CodecError::xml)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::Xml("unexpected end of document".into()));
    }
    Ok(root)
}

fn resolved_namespace(resolved: ResolveResult) -> Result<Option<String>, CodecError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(utf8(ns.as_ref())?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(CodecError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart,
) -> Result<Element, CodecError> {
    let mut element = Element {
        namespace,
        name: utf8(start.local_name().as_ref())?,
        ..Default::default()
    };

    for attr in start.attributes() {
        let attr = attr.map_err(CodecError::xml)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = resolved_namespace(resolved)?;
        let value = attr.unescape_value().map_err(CodecError::xml)?;
        element.attributes.push(Attribute {
            namespace,
            name: utf8(local.as_ref())?,
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(CodecError::Xml("multiple root elements".into())),
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(CodecError::xml)
}

/// Serialize `root` as a standalone document.
pub fn write_document(root: &Element, config: &CodecConfig) -> Result<String, CodecError> {
    let mut writer = match config.indent {
        Some(size) => Writer::new_with_indent(Vec::new(), b' ', size),
        None => Writer::new(Vec::new()),
    };

    if config.xml_declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(CodecError::xml)?;
    }

    write_element(&mut writer, root, &Scope::default())?;
    String::from_utf8(writer.into_inner()).map_err(CodecError::xml)
}

#[derive(Clone, Default)]
struct Scope {
    default_namespace: Option<String>,
    prefixes: Vec<(String, String)>,
}

impl Scope {
    fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .rev()
            .find(|(_, uri)| uri == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Whether `prefix` currently resolves to `namespace`.
    fn binds(&self, prefix: &str, namespace: &str) -> bool {
        self.prefixes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .is_some_and(|(_, uri)| uri == namespace)
    }

    fn bind(&mut self, prefix: &str, namespace: &str) {
        self.prefixes
            .push((prefix.to_string(), namespace.to_string()));
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
    inherited: &Scope,
) -> Result<(), CodecError> {
    let mut scope = inherited.clone();
    let mut start = BytesStart::new(element.name.as_str());

    if element.namespace != scope.default_namespace {
        start.push_attribute(("xmlns", element.namespace.as_deref().unwrap_or("")));
        scope.default_namespace = element.namespace.clone();
    }
    for (prefix, uri) in &element.declarations {
        if scope.binds(prefix, uri) {
            continue;
        }
        start.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
        scope.bind(prefix, uri);
    }

    for attr in &element.attributes {
        let Some(uri) = attr.namespace.as_deref() else {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
            continue;
        };
        let prefix = match scope.prefix_for(uri).map(str::to_string) {
            Some(prefix) => prefix,
            None => {
                let prefix = format!("ns{}", scope.prefixes.len());
                start.push_attribute((format!("xmlns:{prefix}").as_str(), uri));
                scope.bind(&prefix, uri);
                prefix
            }
        };
        start.push_attribute((format!("{prefix}:{}", attr.name).as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(CodecError::xml);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(CodecError::xml)?;
    if !element.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(CodecError::xml)?;
    }
    for child in &element.children {
        write_element(writer, child, &scope)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(CodecError::xml)
}
