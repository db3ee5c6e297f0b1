//! Atom envelope around entity payloads.
//!
//! Single entities travel as a bare `entry`; collections as a `feed` of
//! entries. In both, the payload sits at `entry/content/<ElementName>` in the
//! broker namespace (or unqualified).

use crate::config::CodecConfig;
use crate::error::{ManagementError, Result};
use crate::xml::{self, Element, ATOM_NS, SERVICE_BUS_NS};

const CONTENT_TYPE: &str = "application/xml";

/// An entity description that can be carried in an Atom entry.
pub trait AtomEntity: Sized {
    /// Caller-supplied context the payload alone does not carry
    /// (a subscription's topic path, for instance).
    type Context: ?Sized;

    /// Local name of the payload element inside `content`.
    const ELEMENT_NAME: &'static str;

    /// Build the payload element from the current field values.
    fn to_payload(&self) -> Element;

    /// Entry title; the entity name for entities that have one.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Build a validated entity from an unwrapped entry.
    fn from_entry(context: &Self::Context, entry: &AtomEntry) -> Result<Self>;
}

/// An unwrapped `entry`.
#[derive(Clone, Debug)]
pub struct AtomEntry {
    /// Text of the entry's `title`, the entity name.
    pub title: Option<String>,
    pub payload: Element,
}

/// Wrap a payload as `entry/[title]/content/payload`.
pub fn wrap_entry(title: Option<&str>, payload: Element) -> Element {
    let mut entry = Element::new(ATOM_NS, "entry");
    if let Some(title) = title {
        entry.push(Element::text_element(ATOM_NS, "title", title).with_attribute("type", "text"));
    }
    entry.with_child(
        Element::new(ATOM_NS, "content")
            .with_attribute("type", CONTENT_TYPE)
            .with_child(payload),
    )
}

/// Serialize an entity as an Atom entry document.
#[tracing::instrument(skip_all)]
pub fn to_entry_xml<E: AtomEntity>(entity: &E, config: &CodecConfig) -> Result<String> {
    let document = wrap_entry(entity.title(), entity.to_payload());
    Ok(xml::write_document(&document, config)?)
}

/// Parse a single-entry document.
///
/// Fails with `EntityNotFound` when the document is empty, its root is not
/// `entry`, or the entry has no payload element. Any other failure is
/// reported as a communication error.
#[tracing::instrument(skip_all)]
pub fn parse_entry<E: AtomEntity>(context: &E::Context, document: &str) -> Result<E> {
    let root = match xml::parse_document(document)? {
        Some(root) if root.is_named("entry") => root,
        _ => return Err(not_found(E::ELEMENT_NAME, "response is not an Atom entry")),
    };
    let entry = unwrap_entry(root, E::ELEMENT_NAME)?;
    E::from_entry(context, &entry).map_err(ManagementError::wrap_parse)
}

/// Parse a feed document, keeping document order.
///
/// An empty feed is reported as `EntityNotFound`, same as a wrong root.
#[tracing::instrument(skip_all)]
pub fn parse_feed<E: AtomEntity>(context: &E::Context, document: &str) -> Result<Vec<E>> {
    let root = match xml::parse_document(document)? {
        Some(root) if root.is_named("feed") => root,
        _ => return Err(not_found(E::ELEMENT_NAME, "response is not an Atom feed")),
    };

    let entries: Vec<Element> = root
        .children
        .into_iter()
        .filter(|child| child.is_named("entry"))
        .collect();
    if entries.is_empty() {
        return Err(not_found(E::ELEMENT_NAME, "feed has no entries"));
    }

    tracing::debug!(count = entries.len(), entity = E::ELEMENT_NAME, "parsing feed");
    entries
        .into_iter()
        .map(|entry| {
            let entry = unwrap_entry(entry, E::ELEMENT_NAME)?;
            E::from_entry(context, &entry).map_err(ManagementError::wrap_parse)
        })
        .collect()
}

fn unwrap_entry(mut entry: Element, payload_name: &str) -> Result<AtomEntry> {
    let title = entry.child_text("title").map(|t| t.trim().to_string());

    let payload = entry
        .children
        .iter_mut()
        .find(|child| child.is_named("content"))
        .and_then(|content| {
            let idx = content
                .children
                .iter()
                .position(|c| c.is_named(payload_name) && is_payload_namespace(c))?;
            Some(content.children.swap_remove(idx))
        })
        .ok_or_else(|| not_found(payload_name, "entry has no description payload"))?;

    Ok(AtomEntry { title, payload })
}

/// Payloads live in the broker namespace; unqualified ones are accepted too.
fn is_payload_namespace(element: &Element) -> bool {
    matches!(element.namespace.as_deref(), None | Some(SERVICE_BUS_NS))
}

fn not_found(entity: &str, reason: &str) -> ManagementError {
    ManagementError::EntityNotFound(format!("{entity}: {reason}"))
}
