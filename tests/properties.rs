//! Property-based tests for validated setters and the wire codec.

use proptest::prelude::*;
use sb_management::duration::{format_duration, parse_duration};
use sb_management::{
    parse_subscription, serialize_subscription, CodecConfig, CorrelationFilter, EntityStatus,
    Filter, RuleDescription, SubscriptionDescription, MAX_DURATION,
};
use std::collections::BTreeMap;
use std::time::Duration;

const MAX_SECS: u64 = 922_337_203_684;

fn description() -> SubscriptionDescription {
    SubscriptionDescription::new("orders", "audit").unwrap()
}

fn duration_between(min_secs: u64, max_secs: u64) -> impl Strategy<Value = Duration> {
    (min_secs..=max_secs, 0u32..1_000).prop_map(|(secs, millis)| {
        Duration::from_secs(secs) + Duration::from_millis(u64::from(millis))
    })
}

fn entity_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.-]{0,20}"
}

fn optional_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z0-9 <>&'\"-]{0,16}")
}

fn correlation_filter() -> impl Strategy<Value = CorrelationFilter> {
    (
        optional_text(),
        optional_text(),
        optional_text(),
        optional_text(),
        proptest::collection::btree_map("[a-zA-Z][a-zA-Z0-9]{0,8}", "[ -~]{0,16}", 0..4),
    )
        .prop_map(|(correlation_id, label, to, session_id, properties)| CorrelationFilter {
            correlation_id,
            label,
            to,
            session_id,
            properties,
            ..Default::default()
        })
}

fn filter() -> impl Strategy<Value = Filter> {
    prop_oneof![
        "[ -~]{0,64}".prop_map(Filter::sql),
        Just(Filter::true_filter()),
        Just(Filter::false_filter()),
        correlation_filter().prop_map(Filter::from),
    ]
}

fn entity_status() -> impl Strategy<Value = EntityStatus> {
    proptest::sample::select(EntityStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_duration_literal_roundtrip(value in duration_between(0, MAX_SECS)) {
        let literal = format_duration(value);
        prop_assert_eq!(parse_duration(&literal).unwrap(), value);
    }

    #[test]
    fn prop_ttl_in_bounds_is_kept(ttl in duration_between(1, MAX_SECS)) {
        let mut d = description();
        d.set_default_message_time_to_live(ttl).unwrap();
        prop_assert_eq!(d.default_message_time_to_live(), ttl);
    }

    #[test]
    fn prop_ttl_below_minimum_is_rejected(millis in 0u64..1_000) {
        let mut d = description();
        d.set_default_message_time_to_live(Duration::from_secs(60)).unwrap();
        prop_assert!(d.set_default_message_time_to_live(Duration::from_millis(millis)).is_err());
        prop_assert_eq!(d.default_message_time_to_live(), Duration::from_secs(60));
    }

    #[test]
    fn prop_auto_delete_below_minimum_is_rejected(secs in 0u64..300) {
        let mut d = description();
        prop_assert!(d.set_auto_delete_on_idle(Duration::from_secs(secs)).is_err());
        prop_assert_eq!(d.auto_delete_on_idle(), MAX_DURATION);
    }

    #[test]
    fn prop_auto_delete_at_least_minimum_is_kept(idle in duration_between(300, MAX_SECS)) {
        let mut d = description();
        d.set_auto_delete_on_idle(idle).unwrap();
        prop_assert_eq!(d.auto_delete_on_idle(), idle);
    }

    #[test]
    fn prop_max_delivery_count(count in any::<i32>()) {
        let mut d = description();
        let result = d.set_max_delivery_count(count);
        if count >= 1 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(d.max_delivery_count(), count);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(d.max_delivery_count(), 10);
        }
    }

    #[test]
    fn prop_forward_to_self_rejected_in_any_case(
        topic in entity_name(),
        upper in proptest::collection::vec(any::<bool>(), 21),
    ) {
        let target: String = topic
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();

        let mut d = SubscriptionDescription::new(topic.as_str(), "audit").unwrap();
        prop_assert!(d.set_forward_to(Some(target.as_str())).is_err());
        prop_assert!(d.set_forward_dead_lettered_messages_to(Some(target.as_str())).is_err());
        prop_assert_eq!(d.forward_to(), None);
        prop_assert_eq!(d.forward_dead_lettered_messages_to(), None);
    }

    #[test]
    fn prop_forward_to_self_rejected_non_ascii(topic in "[a-zäöüéçñ][a-zäöüéçñ0-9-]{0,20}") {
        let mut d = SubscriptionDescription::new(topic.as_str(), "audit").unwrap();
        let target = topic.to_uppercase();
        prop_assert!(d.set_forward_to(Some(target.as_str())).is_err());
        prop_assert_eq!(d.forward_to(), None);

        let other = SubscriptionDescription::new(target.as_str(), "AUDIT").unwrap();
        prop_assert_eq!(&other, &SubscriptionDescription::new(topic.as_str(), "audit").unwrap());
    }

    #[test]
    fn prop_description_roundtrip(
        name in entity_name(),
        lock_secs in 1u64..300,
        ttl in proptest::option::of(duration_between(1, 86_400 * 30)),
        idle in proptest::option::of(duration_between(300, 86_400 * 30)),
        max_delivery_count in 1i32..2_000,
        flags in any::<(bool, bool, bool)>(),
        status in entity_status(),
        forward_to in proptest::option::of("fwd-[a-z]{1,10}"),
        user_metadata in proptest::option::of("[ -~]{0,64}"),
        rule_filter in proptest::option::of(filter()),
    ) {
        let (requires_session, dl_on_expiration, dl_on_filter_errors) = flags;
        let mut builder = SubscriptionDescription::builder("orders", name.as_str())
            .lock_duration(Duration::from_secs(lock_secs))
            .max_delivery_count(max_delivery_count)
            .requires_session(requires_session)
            .enable_dead_lettering_on_message_expiration(dl_on_expiration)
            .enable_dead_lettering_on_filter_evaluation_exceptions(dl_on_filter_errors)
            .status(status);
        if let Some(ttl) = ttl {
            builder = builder.default_message_time_to_live(ttl);
        }
        if let Some(idle) = idle {
            builder = builder.auto_delete_on_idle(idle);
        }
        if let Some(forward_to) = &forward_to {
            builder = builder.forward_to(forward_to);
        }
        if let Some(metadata) = user_metadata {
            builder = builder.user_metadata(metadata);
        }
        if let Some(filter) = rule_filter {
            builder = builder.default_rule(RuleDescription::default_rule(filter));
        }
        let original = builder.build().unwrap();

        let xml = serialize_subscription(&original, &CodecConfig::default()).unwrap();
        let parsed = parse_subscription("orders", &xml).unwrap();
        prop_assert_eq!(parsed, original);
    }

    #[test]
    fn prop_correlation_properties_roundtrip(
        properties in proptest::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_]{0,12}", "[ -~]{0,24}", 0..8),
    ) {
        let mut filter = CorrelationFilter::new();
        filter.properties = properties.clone();
        let d = SubscriptionDescription::builder("orders", "audit")
            .default_rule(RuleDescription::default_rule(filter))
            .build()
            .unwrap();

        let xml = serialize_subscription(&d, &CodecConfig::fragment()).unwrap();
        let parsed = parse_subscription("orders", &xml).unwrap();
        let Some(Filter::Correlation(parsed_filter)) = parsed.default_rule().and_then(|r| r.filter()) else {
            return Err(TestCaseError::fail("correlation filter lost"));
        };
        let expected: BTreeMap<String, String> = properties;
        prop_assert_eq!(&parsed_filter.properties, &expected);
    }
}
