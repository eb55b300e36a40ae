//! Platform identifiers
//!
//! An [`Id`] is a non-zero 64-bit value. Its canonical form is 16 lowercase
//! hex characters, which is also the key encoding used by the bucket
//! keyspace. Because the encoding is fixed-width, lexical order of encoded
//! ids equals numeric order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{StrandError, StrandResult};

/// Length of an encoded id
pub const ID_LENGTH: usize = 16;

/// Bucket that receives archived task runs
pub const TASK_SYSTEM_BUCKET_ID: Id = Id(0xa);

/// Non-zero 64-bit platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u64);

impl Id {
    /// Wrap a raw value; zero is not a valid id
    pub fn new(raw: u64) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Id(raw))
        }
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The 16 ASCII hex bytes used as a storage key
    pub fn encode(&self) -> [u8; ID_LENGTH] {
        let mut out = [0u8; ID_LENGTH];
        out.copy_from_slice(self.to_string().as_bytes());
        out
    }

    /// Decode the 16-byte key form
    pub fn decode(bytes: &[u8]) -> StrandResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| StrandError::decode("id is not valid utf-8", bytes))?;
        Self::from_hex(text)
    }

    /// Parse the 16 hex character form
    pub fn from_hex(text: &str) -> StrandResult<Self> {
        if text.len() != ID_LENGTH {
            return Err(StrandError::decode(
                format!("id must be {} hex characters", ID_LENGTH),
                text.as_bytes(),
            ));
        }
        let raw = u64::from_str_radix(text, 16)
            .map_err(|_| StrandError::decode("id is not hexadecimal", text.as_bytes()))?;
        Id::new(raw).ok_or_else(|| StrandError::decode("id must not be zero", text.as_bytes()))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Id {
    type Err = StrandError;

    fn from_str(s: &str) -> StrandResult<Self> {
        Id::from_hex(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Id::from_hex(&text).map_err(serde::de::Error::custom)
    }
}
