//! Broker bounds and the checks validated setters run before committing.

use crate::error::ValidationError;
use crate::duration::format_duration;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// TimeSpan.MaxValue on the broker side; stands in for "infinite".
pub const MAX_DURATION: Duration = Duration::new(922_337_203_685, 477_580_700);

pub const MIN_ALLOWED_TTL: Duration = Duration::from_secs(1);
pub const MAX_ALLOWED_TTL: Duration = MAX_DURATION;
pub const MIN_ALLOWED_AUTODELETE_DURATION: Duration = Duration::from_secs(5 * 60);
pub const MIN_ALLOWED_MAX_DELIVERY_COUNT: i32 = 1;

pub const QUEUE_NAME_MAX_LENGTH: usize = 260;
pub const TOPIC_NAME_MAX_LENGTH: usize = 260;
pub const SUBSCRIPTION_NAME_MAX_LENGTH: usize = 50;
pub const RULE_NAME_MAX_LENGTH: usize = 50;
pub const MAX_USER_METADATA_LENGTH: usize = 1024;

const PATH_DELIMITER: char = '/';

static RESERVED: OnceLock<Regex> = OnceLock::new();

fn reserved_chars() -> &'static Regex {
    RESERVED.get_or_init(|| Regex::new(r"[@?#*]").expect("static pattern"))
}

/// `min <= value <= max`.
pub fn check_duration_range(
    field: &'static str,
    value: Duration,
    min: Duration,
    max: Duration,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::duration_out_of_range(
            field,
            value,
            format!(
                "between {} and {}",
                format_duration(min),
                format_duration(max)
            ),
        ));
    }
    Ok(())
}

/// `value >= min`.
pub fn check_min_duration(
    field: &'static str,
    value: Duration,
    min: Duration,
) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::duration_out_of_range(
            field,
            value,
            format!("at least {}", format_duration(min)),
        ));
    }
    Ok(())
}

pub fn check_positive(field: &'static str, value: Duration) -> Result<(), ValidationError> {
    if value.is_zero() {
        return Err(ValidationError::duration_out_of_range(
            field,
            value,
            "greater than zero",
        ));
    }
    Ok(())
}

/// `value < bound`.
pub fn check_below(
    field: &'static str,
    value: Duration,
    bound: Duration,
) -> Result<(), ValidationError> {
    if value >= bound {
        return Err(ValidationError::duration_out_of_range(
            field,
            value,
            format!("less than {}", format_duration(bound)),
        ));
    }
    Ok(())
}

pub fn check_min_count(field: &'static str, value: i32, min: i32) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            bound: format!("at least {min}"),
        });
    }
    Ok(())
}

pub fn check_max_length(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn check_valid_queue_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    check_entity_name(field, name, QUEUE_NAME_MAX_LENGTH, true)
}

pub fn check_valid_topic_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    check_entity_name(field, name, TOPIC_NAME_MAX_LENGTH, true)
}

pub fn check_valid_subscription_name(
    field: &'static str,
    name: &str,
) -> Result<(), ValidationError> {
    check_entity_name(field, name, SUBSCRIPTION_NAME_MAX_LENGTH, false)
}

pub fn check_valid_rule_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    check_entity_name(field, name, RULE_NAME_MAX_LENGTH, false)
}

fn check_entity_name(
    field: &'static str,
    name: &str,
    max_length: usize,
    allow_separator: bool,
) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidName {
        field,
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name cannot be empty".into()));
    }
    if name.trim() != name {
        return Err(invalid("name cannot start or end with whitespace".into()));
    }
    if name.chars().count() > max_length {
        return Err(invalid(format!("name exceeds {max_length} characters")));
    }
    if let Some(found) = reserved_chars().find(name) {
        return Err(invalid(format!(
            "'{}' is a reserved character",
            found.as_str()
        )));
    }
    if allow_separator {
        if name.starts_with(PATH_DELIMITER) || name.ends_with(PATH_DELIMITER) {
            return Err(invalid(format!(
                "name cannot start or end with '{PATH_DELIMITER}'"
            )));
        }
    } else if name.contains(PATH_DELIMITER) {
        return Err(invalid(format!("name cannot contain '{PATH_DELIMITER}'")));
    }
    Ok(())
}

/// Entity names compare case-insensitively under full Unicode lowercasing.
pub fn names_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_range() {
        assert!(check_duration_range("ttl", Duration::from_secs(1), MIN_ALLOWED_TTL, MAX_ALLOWED_TTL).is_ok());
        assert!(check_duration_range("ttl", MAX_DURATION, MIN_ALLOWED_TTL, MAX_ALLOWED_TTL).is_ok());

        let err = check_duration_range("ttl", Duration::from_millis(999), MIN_ALLOWED_TTL, MAX_ALLOWED_TTL)
            .unwrap_err();
        assert_eq!(err.field(), "ttl");
        assert!(err.to_string().contains("PT0.999S"));
    }

    #[test]
    fn test_min_count() {
        assert!(check_min_count("MaxDeliveryCount", 1, MIN_ALLOWED_MAX_DELIVERY_COUNT).is_ok());
        assert!(check_min_count("MaxDeliveryCount", 0, MIN_ALLOWED_MAX_DELIVERY_COUNT).is_err());
    }

    #[test]
    fn test_queue_names() {
        assert!(check_valid_queue_name("ForwardTo", "orders").is_ok());
        assert!(check_valid_queue_name("ForwardTo", "region/orders").is_ok());
        assert!(check_valid_queue_name("ForwardTo", "").is_err());
        assert!(check_valid_queue_name("ForwardTo", "/orders").is_err());
        assert!(check_valid_queue_name("ForwardTo", "orders/").is_err());
        assert!(check_valid_queue_name("ForwardTo", "ord?ers").is_err());
        assert!(check_valid_queue_name("ForwardTo", &"q".repeat(261)).is_err());
    }

    #[test]
    fn test_subscription_names() {
        assert!(check_valid_subscription_name("SubscriptionName", "audit-log_1").is_ok());
        assert!(check_valid_subscription_name("SubscriptionName", "a/b").is_err());
        assert!(check_valid_subscription_name("SubscriptionName", &"s".repeat(51)).is_err());
        assert!(check_valid_subscription_name("SubscriptionName", "   ").is_err());
        assert!(check_valid_subscription_name("SubscriptionName", "audit ").is_err());
        assert!(check_valid_subscription_name("SubscriptionName", "\taudit").is_err());
        assert!(check_valid_topic_name("TopicPath", "orders\n").is_err());
        assert!(check_valid_subscription_name("SubscriptionName", "audit log").is_ok());
    }

    #[test]
    fn test_names_equal_folds_unicode_case() {
        assert!(names_equal("orders", "ORDERS"));
        assert!(names_equal("örders", "ÖRDERS"));
        assert!(names_equal("Äudit", "äudit"));
        assert!(!names_equal("orders", "order"));
    }

    #[test]
    fn test_below() {
        assert!(check_below("LockDuration", Duration::from_secs(60), MAX_DURATION).is_ok());
        let err = check_below("LockDuration", MAX_DURATION, MAX_DURATION).unwrap_err();
        assert_eq!(err.field(), "LockDuration");
    }
}
