//! Shared value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a broker entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityStatus {
    #[default]
    Active,
    Creating,
    Deleting,
    Disabled,
    ReceiveDisabled,
    Renaming,
    Restoring,
    SendDisabled,
    Unknown,
}

impl EntityStatus {
    pub const ALL: [EntityStatus; 9] = [
        EntityStatus::Active,
        EntityStatus::Creating,
        EntityStatus::Deleting,
        EntityStatus::Disabled,
        EntityStatus::ReceiveDisabled,
        EntityStatus::Renaming,
        EntityStatus::Restoring,
        EntityStatus::SendDisabled,
        EntityStatus::Unknown,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "Active",
            EntityStatus::Creating => "Creating",
            EntityStatus::Deleting => "Deleting",
            EntityStatus::Disabled => "Disabled",
            EntityStatus::ReceiveDisabled => "ReceiveDisabled",
            EntityStatus::Renaming => "Renaming",
            EntityStatus::Restoring => "Restoring",
            EntityStatus::SendDisabled => "SendDisabled",
            EntityStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for EntityStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EntityStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}
