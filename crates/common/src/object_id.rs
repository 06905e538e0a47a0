use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 12-byte Mongo-style object identifier.
///
/// The first four bytes are a big-endian creation timestamp in seconds.
/// Boundary arithmetic on identifiers only ever uses this coarse timestamp
/// component, so identifiers built from a bare timestamp zero-fill the
/// remaining eight bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from a timestamp, remaining bytes zeroed.
    pub fn from_timestamp(seconds: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        Self(bytes)
    }

    /// The embedded creation timestamp, in seconds.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| Error::InvalidObjectId(s.to_string()))?;
            bytes[i] = u8::from_str_radix(hex, 16).map_err(|_| Error::InvalidObjectId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trip() {
        let id = ObjectId::from_timestamp(0x6543_21fe);
        assert_eq!(id.timestamp(), 0x6543_21fe);
    }

    #[test]
    fn hex_round_trip() {
        let id = ObjectId::from_timestamp(1_700_000_000);
        let parsed: ObjectId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_bad_hex() {
        assert!("zz".parse::<ObjectId>().is_err());
        assert!("0123456789abcdef0123456".parse::<ObjectId>().is_err());
    }

    #[test]
    fn orders_by_timestamp_first() {
        let a = ObjectId::from_timestamp(100);
        let b = ObjectId::from_timestamp(200);
        assert!(a < b);
    }
}
