//! Management client over a pluggable transport.
//!
//! The client only builds resource paths and routes bodies through the
//! codec. Verbs, URLs, authentication and retries belong to the
//! [`ManagementTransport`] implementation.

use crate::config::CodecConfig;
use crate::error::{Result, TransportError};
use crate::subscriptions::{
    parse_subscription, parse_subscriptions, serialize_subscription, SubscriptionDescription,
};
use crate::validation::{check_valid_subscription_name, check_valid_topic_name};

/// Whether a write creates a new entity or replaces an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Moves management documents to and from the broker.
pub trait ManagementTransport {
    /// Read the document at `resource_path`.
    fn fetch(&self, resource_path: &str) -> std::result::Result<String, TransportError>;

    /// Write `document` to `resource_path`, returning the response body.
    fn send(
        &self,
        resource_path: &str,
        document: &str,
        mode: WriteMode,
    ) -> std::result::Result<String, TransportError>;
}

/// Subscription management operations.
pub struct ManagementClient<T> {
    transport: T,
    config: CodecConfig,
}

impl<T: ManagementTransport> ManagementClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, CodecConfig::default())
    }

    pub fn with_config(transport: T, config: CodecConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch one subscription.
    ///
    /// A missing subscription surfaces as `EntityNotFound`.
    #[tracing::instrument(skip(self))]
    pub fn get_subscription(
        &self,
        topic_path: &str,
        subscription_name: &str,
    ) -> Result<SubscriptionDescription> {
        check_valid_topic_name("TopicPath", topic_path)?;
        check_valid_subscription_name("SubscriptionName", subscription_name)?;

        let body = self
            .transport
            .fetch(&subscription_path(topic_path, subscription_name))?;
        parse_subscription(topic_path, &body)
    }

    /// Fetch a page of subscriptions of a topic.
    ///
    /// A topic without subscriptions surfaces as `EntityNotFound`.
    #[tracing::instrument(skip(self))]
    pub fn get_subscriptions(
        &self,
        topic_path: &str,
        skip: usize,
        top: usize,
    ) -> Result<Vec<SubscriptionDescription>> {
        check_valid_topic_name("TopicPath", topic_path)?;

        let path = format!("{topic_path}/Subscriptions?$skip={skip}&$top={top}");
        let body = self.transport.fetch(&path)?;
        parse_subscriptions(topic_path, &body)
    }

    /// Create a subscription and return the description the broker stored.
    pub fn create_subscription(
        &self,
        description: &SubscriptionDescription,
    ) -> Result<SubscriptionDescription> {
        self.write(description, WriteMode::Create)
    }

    /// Replace an existing subscription's settings.
    pub fn update_subscription(
        &self,
        description: &SubscriptionDescription,
    ) -> Result<SubscriptionDescription> {
        self.write(description, WriteMode::Update)
    }

    #[tracing::instrument(skip(self, description), fields(
        topic = description.topic_path(),
        subscription = description.subscription_name()
    ))]
    fn write(
        &self,
        description: &SubscriptionDescription,
        mode: WriteMode,
    ) -> Result<SubscriptionDescription> {
        let path = subscription_path(description.topic_path(), description.subscription_name());
        let document = serialize_subscription(description, &self.config)?;
        let body = self.transport.send(&path, &document, mode)?;
        parse_subscription(description.topic_path(), &body)
    }
}

fn subscription_path(topic_path: &str, subscription_name: &str) -> String {
    format!("{topic_path}/Subscriptions/{subscription_name}")
}
