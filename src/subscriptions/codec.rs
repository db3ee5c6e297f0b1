//! Atom/XML codec for subscription descriptions.

use super::types::SubscriptionDescription;
use crate::atom::{self, AtomEntity, AtomEntry};
use crate::config::CodecConfig;
use crate::duration::{format_duration, parse_duration};
use crate::error::{CodecError, Result};
use crate::rules::RuleDescription;
use crate::types::EntityStatus;
use crate::validation::MAX_DURATION;
use crate::xml::{Element, SERVICE_BUS_NS, XSI_NS};
use std::time::Duration;

const DEFAULT_RULE_ELEMENT: &str = "DefaultRuleDescription";

impl AtomEntity for SubscriptionDescription {
    /// Topic path; the payload does not repeat it.
    type Context = str;

    const ELEMENT_NAME: &'static str = "SubscriptionDescription";

    fn title(&self) -> Option<&str> {
        Some(self.subscription_name())
    }

    /// Fields in the order the endpoint expects. Infinite durations and
    /// unset options are left out, which the parser maps back to defaults.
    fn to_payload(&self) -> Element {
        let mut payload =
            Element::new(SERVICE_BUS_NS, Self::ELEMENT_NAME).declare("i", XSI_NS);

        payload.push(duration_element("LockDuration", self.lock_duration()));
        payload.push(bool_element("RequiresSession", self.requires_session()));
        if self.default_message_time_to_live() != MAX_DURATION {
            payload.push(duration_element(
                "DefaultMessageTimeToLive",
                self.default_message_time_to_live(),
            ));
        }
        payload.push(bool_element(
            "DeadLetteringOnMessageExpiration",
            self.enable_dead_lettering_on_message_expiration(),
        ));
        payload.push(bool_element(
            "DeadLetteringOnFilterEvaluationExceptions",
            self.enable_dead_lettering_on_filter_evaluation_exceptions(),
        ));
        if let Some(rule) = self.default_rule() {
            payload.push(rule.to_element(DEFAULT_RULE_ELEMENT));
        }
        payload.push(text_element("MaxDeliveryCount", self.max_delivery_count().to_string()));
        payload.push(text_element("Status", self.status().as_str()));
        if let Some(forward_to) = self.forward_to() {
            payload.push(text_element("ForwardTo", forward_to));
        }
        if let Some(metadata) = self.user_metadata() {
            payload.push(text_element("UserMetadata", metadata));
        }
        if let Some(forward_to) = self.forward_dead_lettered_messages_to() {
            payload.push(text_element("ForwardDeadLetteredMessagesTo", forward_to));
        }
        if self.auto_delete_on_idle() != MAX_DURATION {
            payload.push(duration_element("AutoDeleteOnIdle", self.auto_delete_on_idle()));
        }
        payload
    }

    fn from_entry(topic_path: &str, entry: &AtomEntry) -> Result<Self> {
        let name = entry
            .title
            .as_deref()
            .ok_or(CodecError::MissingElement("title"))?;
        let mut description = SubscriptionDescription::new(topic_path, name)?;
        apply_payload(&mut description, &entry.payload)?;
        Ok(description)
    }
}

/// Apply each recognized payload child through its validated setter.
///
/// Unrecognized elements are skipped so newer server fields do not break
/// parsing.
fn apply_payload(description: &mut SubscriptionDescription, payload: &Element) -> Result<()> {
    for child in &payload.children {
        match child.name.as_str() {
            "RequiresSession" => description.set_requires_session(read_bool(child)?),
            "DeadLetteringOnMessageExpiration" => {
                description.set_enable_dead_lettering_on_message_expiration(read_bool(child)?)
            }
            "DeadLetteringOnFilterEvaluationExceptions" => description
                .set_enable_dead_lettering_on_filter_evaluation_exceptions(read_bool(child)?),
            "LockDuration" => description.set_lock_duration(read_duration(child)?)?,
            "DefaultMessageTimeToLive" => {
                description.set_default_message_time_to_live(read_duration(child)?)?
            }
            "AutoDeleteOnIdle" => description.set_auto_delete_on_idle(read_duration(child)?)?,
            "MaxDeliveryCount" => description.set_max_delivery_count(read_int(child)?)?,
            "Status" => description.set_status(read_status(child)?),
            "ForwardTo" => description.set_forward_to(Some(child.text.trim()))?,
            "ForwardDeadLetteredMessagesTo" => {
                description.set_forward_dead_lettered_messages_to(Some(child.text.trim()))?
            }
            "UserMetadata" => description.set_user_metadata(Some(child.text.clone()))?,
            DEFAULT_RULE_ELEMENT => {
                description.set_default_rule(Some(RuleDescription::from_element(child)?))
            }
            other => tracing::debug!(element = other, "skipping unknown subscription element"),
        }
    }
    Ok(())
}

fn text_element(name: &str, text: impl Into<String>) -> Element {
    Element::text_element(SERVICE_BUS_NS, name, text)
}

fn bool_element(name: &str, value: bool) -> Element {
    text_element(name, if value { "true" } else { "false" })
}

fn duration_element(name: &str, value: Duration) -> Element {
    text_element(name, format_duration(value))
}

fn invalid_literal(element: &Element, kind: &'static str) -> CodecError {
    CodecError::InvalidLiteral {
        element: element.name.clone(),
        kind,
        value: element.text.clone(),
    }
}

fn read_bool(element: &Element) -> std::result::Result<bool, CodecError> {
    let text = element.text.trim();
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid_literal(element, "boolean"))
    }
}

fn read_int(element: &Element) -> std::result::Result<i32, CodecError> {
    element
        .text
        .trim()
        .parse()
        .map_err(|_| invalid_literal(element, "integer"))
}

fn read_duration(element: &Element) -> std::result::Result<Duration, CodecError> {
    parse_duration(&element.text)
}

fn read_status(element: &Element) -> std::result::Result<EntityStatus, CodecError> {
    element
        .text
        .parse()
        .map_err(|_| invalid_literal(element, "status"))
}

/// Parse a single-subscription response for `topic_path`.
pub fn parse_subscription(topic_path: &str, document: &str) -> Result<SubscriptionDescription> {
    atom::parse_entry(topic_path, document)
}

/// Parse a subscription feed for `topic_path`, in document order.
pub fn parse_subscriptions(
    topic_path: &str,
    document: &str,
) -> Result<Vec<SubscriptionDescription>> {
    atom::parse_feed(topic_path, document)
}

/// Serialize a subscription as an Atom entry document.
pub fn serialize_subscription(
    description: &SubscriptionDescription,
    config: &CodecConfig,
) -> Result<String> {
    atom::to_entry_xml(description, config)
}
