//! # Service Bus management codec
//!
//! Converts between validated in-memory descriptions of broker entities and
//! the Atom/XML documents a Service Bus management endpoint exchanges.
//!
//! ## Core Concepts
//!
//! - **Descriptions**: entities whose setters validate before committing, so
//!   an invalid description cannot be observed
//! - **Filters**: a closed set of rule filters, tagged on the wire by `i:type`
//! - **Atom envelope**: `entry` for one entity, `feed` for a collection
//! - **Transport**: a caller-supplied seam that moves documents; this crate
//!   never performs I/O itself
//!
//! ## Example
//!
//! ```
//! use sb_management::{parse_subscription, Filter, RuleDescription, SubscriptionDescription};
//!
//! let body = r#"<entry xmlns="http://www.w3.org/2005/Atom">
//!   <title type="text">sub1</title>
//!   <content type="application/xml">
//!     <SubscriptionDescription xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect">
//!       <LockDuration>PT45S</LockDuration>
//!       <MaxDeliveryCount>5</MaxDeliveryCount>
//!     </SubscriptionDescription>
//!   </content>
//! </entry>"#;
//!
//! let description = parse_subscription("topicA", body)?;
//! assert_eq!(description.subscription_name(), "sub1");
//! assert_eq!(description.max_delivery_count(), 5);
//!
//! // New subscriptions can carry their default rule.
//! let create = SubscriptionDescription::builder("topicA", "priority")
//!     .default_rule(RuleDescription::default_rule(Filter::sql("priority > 3")))
//!     .build()?;
//! # let _ = create;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod atom;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod filters;
pub mod rules;
pub mod subscriptions;
pub mod types;
pub mod validation;
pub mod xml;

// Re-exports
pub use atom::{AtomEntity, AtomEntry};
pub use client::{ManagementClient, ManagementTransport, WriteMode};
pub use config::CodecConfig;
pub use error::{CodecError, ManagementError, Result, TransportError, ValidationError};
pub use filters::{
    parse_filter, serialize_filter, CorrelationFilter, Filter, FilterKind, SqlFilter, SqlFilterKind,
};
pub use rules::{RuleDescription, DEFAULT_RULE_NAME};
pub use subscriptions::{
    parse_subscription, parse_subscriptions, serialize_subscription, SubscriptionDescription,
    SubscriptionDescriptionBuilder,
};
pub use types::EntityStatus;
pub use validation::MAX_DURATION;
