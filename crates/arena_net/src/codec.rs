//! MessagePack codec helpers.
//!
//! Payloads are encoded as maps (field names included) so that peers running
//! different builds can still read messages that gained optional fields.

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Encode a value to MessagePack bytes with named fields.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec_named(value).map_err(NetError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::Decode)
}

#[cfg(test)]
mod tests {
    use arena_core::EntityId;

    use super::*;
    use crate::messages::InactivityChanged;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OlderInactivityChanged {
        entity: EntityId,
        inactive: bool,
    }

    #[test]
    fn test_older_reader_ignores_new_fields() {
        let msg = InactivityChanged {
            entity: EntityId(9),
            inactive: false,
            display_name: "Ayla".to_string(),
            sequence: 2,
            origin: "peer-a".to_string(),
        };
        let bytes = encode(&msg).unwrap();
        let older: OlderInactivityChanged = decode(&bytes).unwrap();
        assert_eq!(
            older,
            OlderInactivityChanged {
                entity: EntityId(9),
                inactive: false
            }
        );
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result: Result<InactivityChanged, _> = decode(&[0xFF, 0xFF]);
        assert!(matches!(result, Err(NetError::Decode(_))));
    }
}
