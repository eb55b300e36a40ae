//! Bucket records
//!
//! Two shapes live in the bucket keyspace:
//!
//! - [`LegacyBucket`]: what older releases wrote. It carries two optional
//!   organization-name fields (`organization`, then later `org`) that may be
//!   stale, conflicting, or missing.
//! - [`Bucket`]: the current shape. `org` is always the current name of the
//!   organization identified by `org_id`.
//!
//! The legacy shape is a superset reader, so a record already in the
//! current shape decodes as a `LegacyBucket` too.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StrandError, StrandResult};
use crate::id::Id;

/// Bucket in the current schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket id, also the storage key
    pub id: Id,
    /// Owning organization
    #[serde(rename = "orgID")]
    pub org_id: Id,
    /// Current name of the owning organization
    pub org: String,
    /// Bucket name
    pub name: String,
    /// Retention policy name (v1 compatibility)
    #[serde(rename = "rp", default, skip_serializing_if = "String::is_empty")]
    pub retention_policy_name: String,
    /// How long data is kept
    #[serde(rename = "retentionPeriod", with = "duration_nanos")]
    pub retention_period: Duration,
}

impl Bucket {
    /// Build the canonical record from a legacy one and the resolved org name
    ///
    /// The legacy name fields are ignored; only `org_name` is used.
    pub fn from_legacy(legacy: &LegacyBucket, org_name: String) -> Self {
        Bucket {
            id: legacy.id,
            org_id: legacy.org_id,
            org: org_name,
            name: legacy.name.clone(),
            retention_policy_name: legacy.retention_policy_name.clone(),
            retention_period: legacy.retention_period,
        }
    }

    /// JSON encoding stored under the bucket's encoded id
    pub fn to_bytes(&self) -> StrandResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a canonical record
    pub fn from_bytes(bytes: &[u8]) -> StrandResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            StrandError::decode(format!("unprocessable bucket ({e})"), bytes)
        })
    }
}

/// Bucket as written by older releases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBucket {
    /// Bucket id
    pub id: Id,
    /// Owning organization
    #[serde(rename = "orgID")]
    pub org_id: Id,
    /// Oldest organization-name field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Newer organization-name field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Bucket name
    pub name: String,
    /// Retention policy name
    #[serde(rename = "rp", default, skip_serializing_if = "String::is_empty")]
    pub retention_policy_name: String,
    /// How long data is kept
    #[serde(rename = "retentionPeriod", default, with = "duration_nanos")]
    pub retention_period: Duration,
}

impl LegacyBucket {
    /// Decode a raw keyspace value
    pub fn from_bytes(bytes: &[u8]) -> StrandResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            StrandError::decode(format!("unprocessable legacy bucket ({e})"), bytes)
        })
    }

    /// Encode in the legacy wire shape
    pub fn to_bytes(&self) -> StrandResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Durations travel as signed 64-bit integer nanoseconds
pub mod duration_nanos {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as whole nanoseconds
    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = i64::try_from(d.as_nanos()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_i64(nanos)
    }

    /// Deserialize from whole nanoseconds; negative values are rejected
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        let nanos = u64::try_from(nanos)
            .map_err(|_| D::Error::custom(format!("negative retention period: {nanos}ns")))?;
        Ok(Duration::from_nanos(nanos))
    }
}
