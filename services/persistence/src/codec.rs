//! Entity Codec
//!
//! Versioned record envelope with checksums.
//!
//! # Binary Format
//! ```text
//! [version:     u8]   // RECORD_VERSION
//! [kind:        u8]   // RecordKind tag
//! [payload_len: u32]  // little-endian
//! [payload:     bytes] // bincode-serialized record
//! [checksum:    u32]  // CRC32C over version+kind+payload
//! ```
//!
//! Encoding is pure and deterministic. Decoding never panics: truncated,
//! mis-tagged, or bit-flipped input yields a [`DecodeError`].

use crc32c::crc32c;
use serde::de::DeserializeOwned;
use serde::Serialize;
use types::room::Room;
use types::search::SearchQueue;
use types::user::User;

use crate::error::DecodeError;

/// Current record format version.
pub const RECORD_VERSION: u8 = 1;

/// version + kind + payload_len
const HEADER_LEN: usize = 1 + 1 + 4;
const CHECKSUM_LEN: usize = 4;

/// Tag identifying which entity a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    User = 1,
    Room = 2,
    SearchQueue = 3,
}

/// An entity that can be stored through the codec.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;
}

impl Record for Room {
    const KIND: RecordKind = RecordKind::Room;
}

impl Record for SearchQueue {
    const KIND: RecordKind = RecordKind::SearchQueue;
}

fn checksum(version: u8, kind: u8, payload: &[u8]) -> u32 {
    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.push(version);
    buf.push(kind);
    buf.extend_from_slice(payload);
    crc32c(&buf)
}

/// Serialize a record into its envelope.
pub fn encode<T: Record>(record: &T) -> Result<Vec<u8>, DecodeError> {
    let payload =
        bincode::serialize(record).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let kind = T::KIND as u8;
    let crc = checksum(RECORD_VERSION, kind, &payload);

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    buf.push(RECORD_VERSION);
    buf.push(kind);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&crc.to_le_bytes());
    Ok(buf)
}

/// Deserialize a record, validating version, kind, length, and checksum.
pub fn decode<T: Record>(data: &[u8]) -> Result<T, DecodeError> {
    if data.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(DecodeError::Truncated {
            needed: HEADER_LEN + CHECKSUM_LEN,
            available: data.len(),
        });
    }

    let version = data[0];
    if version != RECORD_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let kind = data[1];
    if kind != T::KIND as u8 {
        return Err(DecodeError::KindMismatch {
            expected: T::KIND as u8,
            found: kind,
        });
    }

    let payload_len = u32::from_le_bytes([data[2], data[3], data[4], data[5]]) as usize;
    let total = HEADER_LEN + payload_len + CHECKSUM_LEN;
    if data.len() < total {
        return Err(DecodeError::Truncated {
            needed: total,
            available: data.len(),
        });
    }
    if data.len() > total {
        return Err(DecodeError::Malformed(format!(
            "{} trailing bytes after record",
            data.len() - total
        )));
    }

    let payload = &data[HEADER_LEN..HEADER_LEN + payload_len];
    let crc_bytes = &data[HEADER_LEN + payload_len..total];
    let stored = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let computed = checksum(version, kind, payload);
    if stored != computed {
        return Err(DecodeError::ChecksumMismatch { stored, computed });
    }

    bincode::deserialize(payload).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Encode a counter value (8 bytes, big-endian).
pub fn encode_counter(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a counter value written by [`encode_counter`].
pub fn decode_counter(data: &[u8]) -> Result<u64, DecodeError> {
    let bytes: [u8; 8] = data.try_into().map_err(|_| {
        DecodeError::Malformed(format!("counter must be 8 bytes, found {}", data.len()))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::Index;
    use types::ids::{RoomId, UserId};

    fn sample_room() -> Room {
        Room::new(
            RoomId::new(17).unwrap(),
            vec![UserId::new(1), UserId::new(2)],
        )
    }

    #[test]
    fn test_user_roundtrip() {
        let mut user = User::new(UserId::new(99));
        user.enter(RoomId::new(3).unwrap());
        let bytes = encode(&user).unwrap();
        assert_eq!(decode::<User>(&bytes).unwrap(), user);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode(&sample_room()).unwrap(), encode(&sample_room()).unwrap());
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let bytes = encode(&sample_room()).unwrap();
        for cut in [0, 3, HEADER_LEN, bytes.len() - 1] {
            let err = decode::<Room>(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, DecodeError::Truncated { .. }), "cut {cut}: {err:?}");
        }
    }

    #[test]
    fn test_bit_flip_detected() {
        let mut bytes = encode(&sample_room()).unwrap();
        bytes[HEADER_LEN] ^= 0x01;
        assert!(matches!(
            decode::<Room>(&bytes),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_kind_mismatch_detected() {
        let bytes = encode(&User::new(UserId::new(1))).unwrap();
        assert_eq!(
            decode::<Room>(&bytes).unwrap_err(),
            DecodeError::KindMismatch {
                expected: RecordKind::Room as u8,
                found: RecordKind::User as u8,
            }
        );
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = encode(&SearchQueue::new()).unwrap();
        bytes[0] = 7;
        assert_eq!(
            decode::<SearchQueue>(&bytes).unwrap_err(),
            DecodeError::UnsupportedVersion(7)
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&SearchQueue::new()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode::<SearchQueue>(&bytes),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_zero_room_id_in_payload_rejected() {
        // A valid envelope whose payload claims room 0 still fails to decode.
        let payload = bincode::serialize(&(UserId::new(1), Some(0u64))).unwrap();
        let kind = RecordKind::User as u8;
        let mut bytes = vec![RECORD_VERSION, kind];
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&checksum(RECORD_VERSION, kind, &payload).to_le_bytes());
        assert!(matches!(decode::<User>(&bytes), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_queue_with_duplicate_member_rejected() {
        let payload = bincode::serialize(&vec![UserId::new(4), UserId::new(4)]).unwrap();
        let kind = RecordKind::SearchQueue as u8;
        let mut bytes = vec![RECORD_VERSION, kind];
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&checksum(RECORD_VERSION, kind, &payload).to_le_bytes());
        assert!(matches!(
            decode::<SearchQueue>(&bytes),
            Err(DecodeError::Malformed(ref msg)) if msg.contains("more than once")
        ));
    }

    #[test]
    fn test_counter_codec() {
        assert_eq!(decode_counter(&encode_counter(258)).unwrap(), 258);
        assert!(decode_counter(&[1, 2, 3]).is_err());
    }

    proptest! {
        #[test]
        fn prop_any_bit_flip_is_rejected(
            members in proptest::collection::vec(any::<i64>(), 1..8),
            byte in any::<Index>(),
            bit in 0u8..8,
        ) {
            let room = Room::new(
                RoomId::new(5).unwrap(),
                members.into_iter().map(UserId::new).collect(),
            );
            let mut bytes = encode(&room).unwrap();
            let at = byte.index(bytes.len());
            bytes[at] ^= 1 << bit;
            prop_assert!(decode::<Room>(&bytes).is_err());
        }
    }
}
