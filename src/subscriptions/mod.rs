//! Subscription descriptions and their wire codec.
//!
//! # Example
//!
//! ```
//! use sb_management::subscriptions::{parse_subscription, serialize_subscription};
//! use sb_management::{CodecConfig, SubscriptionDescription};
//! use std::time::Duration;
//!
//! let description = SubscriptionDescription::builder("orders", "audit")
//!     .lock_duration(Duration::from_secs(45))
//!     .max_delivery_count(5)
//!     .build()?;
//!
//! let xml = serialize_subscription(&description, &CodecConfig::default())?;
//! let parsed = parse_subscription("orders", &xml)?;
//! assert_eq!(parsed, description);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod types;

pub use codec::{parse_subscription, parse_subscriptions, serialize_subscription};
pub use types::{
    SubscriptionDescription, SubscriptionDescriptionBuilder, DEFAULT_LOCK_DURATION,
    DEFAULT_MAX_DELIVERY_COUNT,
};
