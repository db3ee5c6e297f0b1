//! The subscription description entity.

use crate::error::ValidationError;
use crate::rules::RuleDescription;
use crate::types::EntityStatus;
use crate::validation::{
    check_below, check_duration_range, check_max_length, check_min_count, check_min_duration,
    check_positive, check_valid_queue_name, check_valid_subscription_name, check_valid_topic_name,
    names_equal, MAX_ALLOWED_TTL,
    MAX_DURATION, MAX_USER_METADATA_LENGTH, MIN_ALLOWED_AUTODELETE_DURATION,
    MIN_ALLOWED_MAX_DELIVERY_COUNT, MIN_ALLOWED_TTL,
};
use std::time::Duration;

pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_DELIVERY_COUNT: i32 = 10;

/// Description of a topic subscription.
///
/// Every setter validates before committing, so an instance is never
/// observably invalid: a rejected value leaves the description as it was.
/// Durations equal to [`MAX_DURATION`] mean "infinite".
#[derive(Clone, Debug)]
pub struct SubscriptionDescription {
    topic_path: String,
    subscription_name: String,
    lock_duration: Duration,
    default_message_time_to_live: Duration,
    auto_delete_on_idle: Duration,
    max_delivery_count: i32,
    requires_session: bool,
    enable_dead_lettering_on_message_expiration: bool,
    enable_dead_lettering_on_filter_evaluation_exceptions: bool,
    status: EntityStatus,
    forward_to: Option<String>,
    forward_dead_lettered_messages_to: Option<String>,
    user_metadata: Option<String>,
    default_rule: Option<RuleDescription>,
}

impl SubscriptionDescription {
    /// A description with every optional field at its default.
    pub fn new(
        topic_path: impl Into<String>,
        subscription_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let topic_path = topic_path.into();
        let subscription_name = subscription_name.into();
        check_valid_topic_name("TopicPath", &topic_path)?;
        check_valid_subscription_name("SubscriptionName", &subscription_name)?;

        Ok(Self {
            topic_path,
            subscription_name,
            lock_duration: DEFAULT_LOCK_DURATION,
            default_message_time_to_live: MAX_DURATION,
            auto_delete_on_idle: MAX_DURATION,
            max_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            requires_session: false,
            enable_dead_lettering_on_message_expiration: false,
            enable_dead_lettering_on_filter_evaluation_exceptions: true,
            status: EntityStatus::Active,
            forward_to: None,
            forward_dead_lettered_messages_to: None,
            user_metadata: None,
            default_rule: None,
        })
    }

    pub fn builder(
        topic_path: impl Into<String>,
        subscription_name: impl Into<String>,
    ) -> SubscriptionDescriptionBuilder {
        SubscriptionDescriptionBuilder {
            description: Self::new(topic_path, subscription_name),
        }
    }

    // --- Accessors ---

    pub fn topic_path(&self) -> &str {
        &self.topic_path
    }

    pub fn subscription_name(&self) -> &str {
        &self.subscription_name
    }

    pub fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    pub fn default_message_time_to_live(&self) -> Duration {
        self.default_message_time_to_live
    }

    pub fn auto_delete_on_idle(&self) -> Duration {
        self.auto_delete_on_idle
    }

    pub fn max_delivery_count(&self) -> i32 {
        self.max_delivery_count
    }

    pub fn requires_session(&self) -> bool {
        self.requires_session
    }

    pub fn enable_dead_lettering_on_message_expiration(&self) -> bool {
        self.enable_dead_lettering_on_message_expiration
    }

    pub fn enable_dead_lettering_on_filter_evaluation_exceptions(&self) -> bool {
        self.enable_dead_lettering_on_filter_evaluation_exceptions
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn forward_to(&self) -> Option<&str> {
        self.forward_to.as_deref()
    }

    pub fn forward_dead_lettered_messages_to(&self) -> Option<&str> {
        self.forward_dead_lettered_messages_to.as_deref()
    }

    pub fn user_metadata(&self) -> Option<&str> {
        self.user_metadata.as_deref()
    }

    pub fn default_rule(&self) -> Option<&RuleDescription> {
        self.default_rule.as_ref()
    }

    // --- Validated setters ---

    pub fn set_topic_path(&mut self, topic_path: impl Into<String>) -> Result<(), ValidationError> {
        let topic_path = topic_path.into();
        check_valid_topic_name("TopicPath", &topic_path)?;
        for (field, target) in [
            ("ForwardTo", &self.forward_to),
            ("ForwardDeadLetteredMessagesTo", &self.forward_dead_lettered_messages_to),
        ] {
            if let Some(target) = target {
                check_not_self(field, target, &topic_path)?;
            }
        }
        self.topic_path = topic_path;
        Ok(())
    }

    pub fn set_subscription_name(
        &mut self,
        subscription_name: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let subscription_name = subscription_name.into();
        check_valid_subscription_name("SubscriptionName", &subscription_name)?;
        self.subscription_name = subscription_name;
        Ok(())
    }

    /// Lock durations have no "infinite" form, so [`MAX_DURATION`] and above
    /// are rejected.
    pub fn set_lock_duration(&mut self, lock_duration: Duration) -> Result<(), ValidationError> {
        check_positive("LockDuration", lock_duration)?;
        check_below("LockDuration", lock_duration, MAX_DURATION)?;
        self.lock_duration = lock_duration;
        Ok(())
    }

    pub fn set_default_message_time_to_live(
        &mut self,
        ttl: Duration,
    ) -> Result<(), ValidationError> {
        check_duration_range("DefaultMessageTimeToLive", ttl, MIN_ALLOWED_TTL, MAX_ALLOWED_TTL)?;
        self.default_message_time_to_live = ttl;
        Ok(())
    }

    /// Values above [`MAX_DURATION`] are clamped to it.
    pub fn set_auto_delete_on_idle(&mut self, idle: Duration) -> Result<(), ValidationError> {
        check_min_duration("AutoDeleteOnIdle", idle, MIN_ALLOWED_AUTODELETE_DURATION)?;
        self.auto_delete_on_idle = clamp_to_max("AutoDeleteOnIdle", idle);
        Ok(())
    }

    pub fn set_max_delivery_count(&mut self, count: i32) -> Result<(), ValidationError> {
        check_min_count("MaxDeliveryCount", count, MIN_ALLOWED_MAX_DELIVERY_COUNT)?;
        self.max_delivery_count = count;
        Ok(())
    }

    pub fn set_requires_session(&mut self, requires_session: bool) {
        self.requires_session = requires_session;
    }

    pub fn set_enable_dead_lettering_on_message_expiration(&mut self, enabled: bool) {
        self.enable_dead_lettering_on_message_expiration = enabled;
    }

    pub fn set_enable_dead_lettering_on_filter_evaluation_exceptions(&mut self, enabled: bool) {
        self.enable_dead_lettering_on_filter_evaluation_exceptions = enabled;
    }

    pub fn set_status(&mut self, status: EntityStatus) {
        self.status = status;
    }

    /// `None` or an empty name clears forwarding.
    pub fn set_forward_to(&mut self, forward_to: Option<&str>) -> Result<(), ValidationError> {
        self.forward_to = self.checked_forward_target("ForwardTo", forward_to)?;
        Ok(())
    }

    /// `None` or an empty name clears forwarding.
    pub fn set_forward_dead_lettered_messages_to(
        &mut self,
        forward_to: Option<&str>,
    ) -> Result<(), ValidationError> {
        self.forward_dead_lettered_messages_to =
            self.checked_forward_target("ForwardDeadLetteredMessagesTo", forward_to)?;
        Ok(())
    }

    pub fn set_user_metadata(&mut self, metadata: Option<String>) -> Result<(), ValidationError> {
        if let Some(metadata) = &metadata {
            check_max_length("UserMetadata", metadata, MAX_USER_METADATA_LENGTH)?;
        }
        self.user_metadata = metadata;
        Ok(())
    }

    /// Rule created together with the subscription.
    pub fn set_default_rule(&mut self, rule: Option<RuleDescription>) {
        self.default_rule = rule;
    }

    fn checked_forward_target(
        &self,
        field: &'static str,
        target: Option<&str>,
    ) -> Result<Option<String>, ValidationError> {
        let Some(target) = target.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        check_valid_queue_name(field, target)?;
        check_not_self(field, target, &self.topic_path)?;
        Ok(Some(target.to_string()))
    }
}

fn check_not_self(field: &'static str, target: &str, topic_path: &str) -> Result<(), ValidationError> {
    if names_equal(target, topic_path) {
        return Err(ValidationError::SelfForwarding {
            field,
            target: target.to_string(),
        });
    }
    Ok(())
}

fn clamp_to_max(field: &'static str, value: Duration) -> Duration {
    if value > MAX_DURATION {
        tracing::warn!(field, "duration exceeds the broker maximum, clamping");
        return MAX_DURATION;
    }
    value
}

fn eq_optional_name(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => names_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Field-wise; names compare case-insensitively.
impl PartialEq for SubscriptionDescription {
    fn eq(&self, other: &Self) -> bool {
        names_equal(&self.topic_path, &other.topic_path)
            && names_equal(&self.subscription_name, &other.subscription_name)
            && self.lock_duration == other.lock_duration
            && self.default_message_time_to_live == other.default_message_time_to_live
            && self.auto_delete_on_idle == other.auto_delete_on_idle
            && self.max_delivery_count == other.max_delivery_count
            && self.requires_session == other.requires_session
            && self.enable_dead_lettering_on_message_expiration
                == other.enable_dead_lettering_on_message_expiration
            && self.enable_dead_lettering_on_filter_evaluation_exceptions
                == other.enable_dead_lettering_on_filter_evaluation_exceptions
            && self.status == other.status
            && eq_optional_name(&self.forward_to, &other.forward_to)
            && eq_optional_name(
                &self.forward_dead_lettered_messages_to,
                &other.forward_dead_lettered_messages_to,
            )
            && self.user_metadata == other.user_metadata
            && self.default_rule == other.default_rule
    }
}

impl Eq for SubscriptionDescription {}

/// Builds a [`SubscriptionDescription`] through the validated setters.
///
/// The first rejected value is kept and returned by [`build`](Self::build);
/// later calls are ignored.
#[derive(Debug)]
pub struct SubscriptionDescriptionBuilder {
    description: Result<SubscriptionDescription, ValidationError>,
}

impl SubscriptionDescriptionBuilder {
    fn apply(
        mut self,
        set: impl FnOnce(&mut SubscriptionDescription) -> Result<(), ValidationError>,
    ) -> Self {
        if let Ok(description) = self.description.as_mut() {
            if let Err(e) = set(description) {
                self.description = Err(e);
            }
        }
        self
    }

    pub fn lock_duration(self, value: Duration) -> Self {
        self.apply(|d| d.set_lock_duration(value))
    }

    pub fn default_message_time_to_live(self, value: Duration) -> Self {
        self.apply(|d| d.set_default_message_time_to_live(value))
    }

    pub fn auto_delete_on_idle(self, value: Duration) -> Self {
        self.apply(|d| d.set_auto_delete_on_idle(value))
    }

    pub fn max_delivery_count(self, value: i32) -> Self {
        self.apply(|d| d.set_max_delivery_count(value))
    }

    pub fn requires_session(self, value: bool) -> Self {
        self.apply(|d| {
            d.set_requires_session(value);
            Ok(())
        })
    }

    pub fn enable_dead_lettering_on_message_expiration(self, value: bool) -> Self {
        self.apply(|d| {
            d.set_enable_dead_lettering_on_message_expiration(value);
            Ok(())
        })
    }

    pub fn enable_dead_lettering_on_filter_evaluation_exceptions(self, value: bool) -> Self {
        self.apply(|d| {
            d.set_enable_dead_lettering_on_filter_evaluation_exceptions(value);
            Ok(())
        })
    }

    pub fn status(self, value: EntityStatus) -> Self {
        self.apply(|d| {
            d.set_status(value);
            Ok(())
        })
    }

    pub fn forward_to(self, value: &str) -> Self {
        self.apply(|d| d.set_forward_to(Some(value)))
    }

    pub fn forward_dead_lettered_messages_to(self, value: &str) -> Self {
        self.apply(|d| d.set_forward_dead_lettered_messages_to(Some(value)))
    }

    pub fn user_metadata(self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.apply(|d| d.set_user_metadata(Some(value)))
    }

    pub fn default_rule(self, rule: RuleDescription) -> Self {
        self.apply(|d| {
            d.set_default_rule(Some(rule));
            Ok(())
        })
    }

    pub fn build(self) -> Result<SubscriptionDescription, ValidationError> {
        self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> SubscriptionDescription {
        SubscriptionDescription::new("orders", "audit").unwrap()
    }

    #[test]
    fn test_defaults() {
        let d = description();
        assert_eq!(d.lock_duration(), Duration::from_secs(60));
        assert_eq!(d.default_message_time_to_live(), MAX_DURATION);
        assert_eq!(d.auto_delete_on_idle(), MAX_DURATION);
        assert_eq!(d.max_delivery_count(), 10);
        assert!(!d.requires_session());
        assert!(!d.enable_dead_lettering_on_message_expiration());
        assert!(d.enable_dead_lettering_on_filter_evaluation_exceptions());
        assert_eq!(d.status(), EntityStatus::Active);
        assert_eq!(d.forward_to(), None);
    }

    #[test]
    fn test_invalid_names() {
        assert!(SubscriptionDescription::new("", "audit").is_err());
        assert!(SubscriptionDescription::new("orders", "a/b").is_err());
    }

    #[test]
    fn test_rejected_value_keeps_previous() {
        let mut d = description();
        d.set_default_message_time_to_live(Duration::from_secs(30)).unwrap();

        let err = d
            .set_default_message_time_to_live(Duration::from_millis(10))
            .unwrap_err();
        assert_eq!(err.field(), "DefaultMessageTimeToLive");
        assert_eq!(d.default_message_time_to_live(), Duration::from_secs(30));

        assert!(d.set_lock_duration(Duration::ZERO).is_err());
        assert_eq!(d.lock_duration(), DEFAULT_LOCK_DURATION);

        assert!(d.set_auto_delete_on_idle(Duration::from_secs(299)).is_err());
        assert_eq!(d.auto_delete_on_idle(), MAX_DURATION);

        assert!(d.set_max_delivery_count(0).is_err());
        assert_eq!(d.max_delivery_count(), DEFAULT_MAX_DELIVERY_COUNT);
    }

    #[test]
    fn test_lock_duration_has_no_infinite_form() {
        let mut d = description();
        assert!(d.set_lock_duration(MAX_DURATION).is_err());
        assert!(d.set_lock_duration(Duration::MAX).is_err());
        assert_eq!(d.lock_duration(), DEFAULT_LOCK_DURATION);
        d.set_lock_duration(MAX_DURATION - Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn test_clamps_above_max() {
        let mut d = description();
        d.set_auto_delete_on_idle(Duration::MAX).unwrap();
        assert_eq!(d.auto_delete_on_idle(), MAX_DURATION);
        assert!(d.set_default_message_time_to_live(Duration::MAX).is_err());
    }

    #[test]
    fn test_self_forwarding() {
        let mut d = description();
        let err = d.set_forward_to(Some("ORDERS")).unwrap_err();
        assert!(matches!(err, ValidationError::SelfForwarding { .. }));
        assert!(d.set_forward_dead_lettered_messages_to(Some("Orders")).is_err());

        d.set_forward_to(Some("archive")).unwrap();
        assert_eq!(d.forward_to(), Some("archive"));

        assert!(d.set_topic_path("Archive").is_err());
        assert_eq!(d.topic_path(), "orders");

        d.set_forward_to(Some("")).unwrap();
        assert_eq!(d.forward_to(), None);
    }

    #[test]
    fn test_self_forwarding_non_ascii() {
        let mut d = SubscriptionDescription::new("örders", "audit").unwrap();
        let err = d.set_forward_to(Some("ÖRDERS")).unwrap_err();
        assert!(matches!(err, ValidationError::SelfForwarding { .. }));
        assert!(d.set_forward_dead_lettered_messages_to(Some("Örders")).is_err());
        assert_eq!(d.forward_to(), None);
        assert_eq!(d.forward_dead_lettered_messages_to(), None);
    }

    #[test]
    fn test_equality_folds_non_ascii_case() {
        assert_eq!(
            SubscriptionDescription::new("Örders", "Äudit").unwrap(),
            SubscriptionDescription::new("örders", "äudit").unwrap()
        );
    }

    #[test]
    fn test_user_metadata_length() {
        let mut d = description();
        assert!(d.set_user_metadata(Some("m".repeat(1025))).is_err());
        d.set_user_metadata(Some("m".repeat(1024))).unwrap();
        assert_eq!(d.user_metadata().map(str::len), Some(1024));
    }

    #[test]
    fn test_equality_ignores_name_case() {
        let a = SubscriptionDescription::builder("Orders", "Audit")
            .forward_to("Archive")
            .build()
            .unwrap();
        let b = SubscriptionDescription::builder("orders", "audit")
            .forward_to("archive")
            .build()
            .unwrap();
        assert_eq!(a, b);

        let c = SubscriptionDescription::builder("orders", "audit")
            .max_delivery_count(3)
            .build()
            .unwrap();
        assert_ne!(b, c);
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let err = SubscriptionDescription::builder("orders", "audit")
            .max_delivery_count(0)
            .forward_to("orders")
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "MaxDeliveryCount");
    }
}
