// WAL record format tests
// Encoding and decoding log frames with CRC checksums.

use walkv::wal::record::HEADER_SIZE;
use walkv::{Command, DecodeError, LogRecord};

// =============================================================================
// Test 1: Encode and decode Put record
// =============================================================================
#[test]
fn encode_decode_put_record() {
    let record = LogRecord::put("key", "value");
    let encoded = record.encode();
    let (decoded, size) = LogRecord::decode(&encoded).unwrap();

    assert_eq!(decoded.command, Command::Put);
    assert_eq!(decoded.key, "key");
    assert_eq!(decoded.value, "value");
    assert_eq!(size, encoded.len());
}

// =============================================================================
// Test 2: Delete record carries no value
// =============================================================================
#[test]
fn delete_record_has_empty_value() {
    let record = LogRecord::delete("key");
    assert!(record.value.is_empty());

    let encoded = record.encode();
    assert_eq!(encoded.len(), HEADER_SIZE + 3);

    let (decoded, _) = LogRecord::decode(&encoded).unwrap();
    assert_eq!(decoded.command, Command::Delete);
    assert_eq!(decoded.key, "key");
    assert!(decoded.value.is_empty());
}

// =============================================================================
// Test 3: A value smuggled onto a Delete is never written
// =============================================================================
#[test]
fn delete_value_is_ignored_on_encode() {
    let record = LogRecord {
        command: Command::Delete,
        key: "key".into(),
        value: "stale".into(),
    };
    let encoded = record.encode();

    assert_eq!(record.encoded_size(), encoded.len());
    let (decoded, _) = LogRecord::decode(&encoded).unwrap();
    assert!(decoded.value.is_empty());
}

// =============================================================================
// Test 4: Corrupted payload is detected by CRC
// =============================================================================
#[test]
fn corrupted_payload_detected() {
    let mut encoded = LogRecord::put("key", "value").encode();
    encoded[10] ^= 0xFF;

    let err = LogRecord::decode(&encoded).unwrap_err();
    assert!(matches!(err, DecodeError::ChecksumMismatch { .. }));
}

// =============================================================================
// Test 5: Empty key and value
// =============================================================================
#[test]
fn empty_key_and_value() {
    let encoded = LogRecord::put("", "").encode();
    let (decoded, size) = LogRecord::decode(&encoded).unwrap();

    assert!(decoded.key.is_empty());
    assert!(decoded.value.is_empty());
    assert_eq!(size, HEADER_SIZE);
}

// =============================================================================
// Test 6: Large, non-ASCII key and value
// =============================================================================
#[test]
fn large_unicode_key_and_value() {
    let key = "ключ".repeat(2_500);
    let value = "値".repeat(30_000);

    let record = LogRecord::put(key.clone(), value.clone());
    let encoded = record.encode();
    let (decoded, _) = LogRecord::decode(&encoded).unwrap();

    assert_eq!(decoded.key, key);
    assert_eq!(decoded.value, value);
    assert_eq!(record.encoded_size(), encoded.len());
}

// =============================================================================
// Test 7: Truncated record fails decode
// =============================================================================
#[test]
fn truncated_record_fails() {
    let encoded = LogRecord::put("key", "value").encode();

    let err = LogRecord::decode(&encoded[..encoded.len() / 2]).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));

    let err = LogRecord::decode(&encoded[..encoded.len() - 1]).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

// =============================================================================
// Test 8: Decoding stops at the frame boundary
// =============================================================================
#[test]
fn decode_leaves_following_frames_alone() {
    let mut buf = LogRecord::put("a", "1").encode();
    LogRecord::delete("b").encode_into(&mut buf);

    let (first, size) = LogRecord::decode(&buf).unwrap();
    assert_eq!(first, LogRecord::put("a", "1"));

    let (second, _) = LogRecord::decode(&buf[size..]).unwrap();
    assert_eq!(second, LogRecord::delete("b"));
}

// =============================================================================
// Test 9: Unknown command byte with a valid CRC is rejected
// =============================================================================
#[test]
fn unknown_command_rejected() {
    let mut encoded = LogRecord::put("key", "value").encode();
    encoded[8] = 0x7F;
    // Re-seal so only the edited field is wrong.
    let crc = crc32fast::hash(&encoded[4..]);
    encoded[0..4].copy_from_slice(&crc.to_le_bytes());

    let err = LogRecord::decode(&encoded).unwrap_err();
    assert_eq!(err, DecodeError::InvalidCommand(0x7F));
}

// =============================================================================
// Test 10: Key length pointing past the frame is rejected
// =============================================================================
#[test]
fn key_length_out_of_bounds_rejected() {
    let mut encoded = LogRecord::put("key", "value").encode();
    encoded[9..13].copy_from_slice(&1_000u32.to_le_bytes());
    // Re-seal so only the edited field is wrong.
    let crc = crc32fast::hash(&encoded[4..]);
    encoded[0..4].copy_from_slice(&crc.to_le_bytes());

    let err = LogRecord::decode(&encoded).unwrap_err();
    assert_eq!(err, DecodeError::KeyOutOfBounds);
}
