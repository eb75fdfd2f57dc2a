//! Tests for AOF Reader
//!
//! These tests verify:
//! - Reading requests back in file order
//! - Clean end of file vs. a record cut short
//! - Position tracking
//! - Iterator behavior

use std::fs::{self, File};
use std::path::PathBuf;

use emberkv::aof::{AofReader, AofWriter};
use emberkv::config::AofSyncStrategy;
use emberkv::protocol::encode_value;
use emberkv::{EmberError, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_aof() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let aof_path = temp_dir.path().join("test.aof");
    (temp_dir, aof_path)
}

fn write_requests(path: &PathBuf, requests: &[Value]) {
    let mut writer = AofWriter::open(path, AofSyncStrategy::EveryWrite).unwrap();
    for request in requests {
        writer.append(request).unwrap();
    }
}

fn sample_requests() -> Vec<Value> {
    vec![
        Value::request(["SET", "a", "1"]),
        Value::request(["HSET", "h", "f", "2"]),
        Value::request(["DEL", "a"]),
    ]
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_open_missing_file_fails() {
    let (_temp, aof_path) = setup_temp_aof();
    assert!(matches!(AofReader::open(&aof_path), Err(EmberError::Io(_))));
}

#[test]
fn test_read_empty_file() {
    let (_temp, aof_path) = setup_temp_aof();
    File::create(&aof_path).unwrap();

    let mut reader = AofReader::open(&aof_path).unwrap();
    assert!(reader.next_request().unwrap().is_none());
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_read_in_file_order() {
    let (_temp, aof_path) = setup_temp_aof();
    let requests = sample_requests();
    write_requests(&aof_path, &requests);

    let mut reader = AofReader::open(&aof_path).unwrap();
    for (i, expected) in requests.iter().enumerate() {
        let request = reader.next_request().unwrap().unwrap();
        assert_eq!(&request, expected, "Request {} mismatch", i);
    }

    // Should reach EOF
    assert!(reader.next_request().unwrap().is_none());
}

#[test]
fn test_position_tracks_complete_records() {
    let (_temp, aof_path) = setup_temp_aof();
    let requests = sample_requests();
    write_requests(&aof_path, &requests);

    let mut reader = AofReader::open(&aof_path).unwrap();
    let mut expected = 0u64;
    for request in &requests {
        reader.next_request().unwrap();
        expected += encode_value(request).len() as u64;
        assert_eq!(reader.position(), expected);
    }
}

#[test]
fn test_truncated_tail_is_unexpected_eof() {
    let (_temp, aof_path) = setup_temp_aof();
    let first = encode_value(&Value::request(["SET", "a", "1"]));
    let second = encode_value(&Value::request(["SET", "b", "2"]));

    let mut bytes = first.to_vec();
    bytes.extend_from_slice(&second[..second.len() - 4]);
    fs::write(&aof_path, &bytes).unwrap();

    let mut reader = AofReader::open(&aof_path).unwrap();
    assert!(reader.next_request().unwrap().is_some());

    match reader.next_request() {
        Err(EmberError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
    assert_eq!(reader.position(), first.len() as u64);
}

#[test]
fn test_garbage_is_protocol_error() {
    let (_temp, aof_path) = setup_temp_aof();
    fs::write(&aof_path, b"?not a record\r\n").unwrap();

    let mut reader = AofReader::open(&aof_path).unwrap();
    assert!(matches!(reader.next_request(), Err(EmberError::Protocol(_))));
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iterator_empty_file() {
    let (_temp, aof_path) = setup_temp_aof();
    File::create(&aof_path).unwrap();

    let reader = AofReader::open(&aof_path).unwrap();
    assert_eq!(reader.requests().count(), 0);
}

#[test]
fn test_iterator_multiple_requests() {
    let (_temp, aof_path) = setup_temp_aof();
    let requests = sample_requests();
    write_requests(&aof_path, &requests);

    let read: Vec<_> = AofReader::open(&aof_path)
        .unwrap()
        .requests()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(read, requests);
}

#[test]
fn test_iterator_stops_after_error() {
    let (_temp, aof_path) = setup_temp_aof();
    let mut bytes = encode_value(&Value::request(["SET", "a", "1"])).to_vec();
    bytes.extend_from_slice(b"*2\r\n$3\r\nDEL");
    fs::write(&aof_path, &bytes).unwrap();

    let results: Vec<_> = AofReader::open(&aof_path).unwrap().requests().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
