use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use crate::error::{AddressStringError, StringErrorKind};

/// An IPv6 scope zone: a numeric scope id `0..=255` or an arbitrary
/// interface name.
///
/// Zones compare as strings and never participate in numeric address
/// ordering.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Zone {
    repr: String,
    scope_id: Option<u8>,
}

impl Zone {
    /// Parse a zone from the text following `%`.
    ///
    /// # Errors
    ///
    /// Fails on an empty zone or one containing separator characters.
    pub fn new(repr: &str) -> Result<Self, AddressStringError> {
        if repr.is_empty() {
            return Err(AddressStringError::new(StringErrorKind::InvalidZone, 0));
        }
        if let Some(pos) = repr
            .bytes()
            .position(|b| matches!(b, b'%' | b'/' | b':' | b'[' | b']') || b.is_ascii_whitespace())
        {
            return Err(AddressStringError::new(StringErrorKind::InvalidZone, pos));
        }
        let scope_id = (repr.bytes().all(|b| b.is_ascii_digit())).then(|| repr.parse().ok()).flatten();
        Ok(Self {
            repr: repr.to_owned(),
            scope_id,
        })
    }

    /// The numeric scope id, where the zone is one.
    #[must_use]
    pub fn scope_id(&self) -> Option<u8> {
        self.scope_id
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.repr
    }
}

impl FromStr for Zone {
    type Err = AddressStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<u8> for Zone {
    fn from(scope_id: u8) -> Self {
        Self {
            repr: scope_id.to_string(),
            scope_id: Some(scope_id),
        }
    }
}

impl PartialOrd for Zone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Zone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.repr.cmp(&other.repr)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}
