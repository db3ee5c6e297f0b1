//! Correlation filters: equality matchers on message properties.

use super::{FilterKind, FILTER_ELEMENT};
use crate::xml::{Element, SERVICE_BUS_NS, XSD_NS, XSI_NS};
use std::collections::BTreeMap;

const PROPERTIES: &str = "Properties";
const PROPERTY_ENTRY: &str = "KeyValueOfstringanyType";

/// Matches messages whose system and user properties equal the set values.
///
/// Unset matchers are not written to the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorrelationFilter {
    pub correlation_id: Option<String>,
    pub message_id: Option<String>,
    pub to: Option<String>,
    pub reply_to: Option<String>,
    pub label: Option<String>,
    pub session_id: Option<String>,
    pub reply_to_session_id: Option<String>,
    pub content_type: Option<String>,
    /// User-defined properties.
    pub properties: BTreeMap<String, String>,
}

impl CorrelationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the correlation id alone, the most common form.
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// System-property matchers in wire order.
    fn matchers(&self) -> [(&'static str, &Option<String>); 8] {
        [
            ("CorrelationId", &self.correlation_id),
            ("MessageId", &self.message_id),
            ("To", &self.to),
            ("ReplyTo", &self.reply_to),
            ("Label", &self.label),
            ("SessionId", &self.session_id),
            ("ReplyToSessionId", &self.reply_to_session_id),
            ("ContentType", &self.content_type),
        ]
    }

    fn matcher_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            "CorrelationId" => &mut self.correlation_id,
            "MessageId" => &mut self.message_id,
            "To" => &mut self.to,
            "ReplyTo" => &mut self.reply_to,
            "Label" => &mut self.label,
            "SessionId" => &mut self.session_id,
            "ReplyToSessionId" => &mut self.reply_to_session_id,
            "ContentType" => &mut self.content_type,
            _ => return None,
        };
        Some(slot)
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new(SERVICE_BUS_NS, FILTER_ELEMENT)
            .declare("i", XSI_NS)
            .with_namespaced_attribute(XSI_NS, "type", FilterKind::Correlation.wire_name());

        for (name, value) in self.matchers() {
            if let Some(value) = value {
                element.push(Element::text_element(SERVICE_BUS_NS, name, value.as_str()));
            }
        }

        if !self.properties.is_empty() {
            let mut properties = Element::new(SERVICE_BUS_NS, PROPERTIES);
            for (key, value) in &self.properties {
                properties.push(
                    Element::new(SERVICE_BUS_NS, PROPERTY_ENTRY)
                        .with_child(Element::text_element(SERVICE_BUS_NS, "Key", key.as_str()))
                        .with_child(
                            Element::text_element(SERVICE_BUS_NS, "Value", value.as_str())
                                .declare("d6p1", XSD_NS)
                                .with_namespaced_attribute(XSI_NS, "type", "d6p1:string"),
                        ),
                );
            }
            element.push(properties);
        }
        element
    }

    pub fn from_element(element: &Element) -> Self {
        let mut filter = Self::default();
        for child in &element.children {
            if child.is_named(PROPERTIES) {
                filter.read_properties(child);
                continue;
            }
            match filter.matcher_mut(&child.name) {
                Some(slot) => *slot = Some(child.text.clone()),
                None => tracing::debug!(element = %child.name, "skipping unknown correlation filter element"),
            }
        }
        filter
    }

    /// Values are kept as text whatever their declared `i:type`.
    fn read_properties(&mut self, properties: &Element) {
        for entry in properties.children_named(PROPERTY_ENTRY) {
            let Some(key) = entry.child_text("Key") else {
                continue;
            };
            let value = entry.child_text("Value").unwrap_or_default();
            self.properties.insert(key.to_string(), value.to_string());
        }
    }
}
