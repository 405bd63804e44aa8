//! Integration tests for the sequential payload reader.

use std::io::Cursor;

use mmkv_reader::{MmkvError, SequentialReader};

/// Encode an unsigned varint the way the format writes them.
fn put_varint(buf: &mut Vec<u8>, mut v: u64) {
    loop {
        let b = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            buf.push(b);
            return;
        }
        buf.push(b | 0x80);
    }
}

/// One length-delimited field: varint length, then the bytes.
fn put_field(buf: &mut Vec<u8>, data: &[u8]) {
    put_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

fn reader(bytes: Vec<u8>) -> SequentialReader<Cursor<Vec<u8>>> {
    let size = bytes.len() as u64;
    SequentialReader::new(Cursor::new(bytes), size)
}

// ---------------------------------------------------------------------------
// Varint decoding
// ---------------------------------------------------------------------------

#[test]
fn varint_round_trip_across_widths() {
    let values = [
        0u64,
        1,
        127,
        128,
        300,
        0x16E,
        16_383,
        16_384,
        u64::from(u32::MAX),
        u64::MAX,
    ];

    let mut buf = Vec::new();
    for v in values {
        put_varint(&mut buf, v);
    }

    let mut rd = reader(buf);
    for v in values {
        assert_eq!(rd.read_varint().unwrap(), v);
    }
    assert!(rd.is_eof());
}

#[test]
fn bounded_varint_reports_bytes_consumed() {
    let mut buf = Vec::new();
    put_varint(&mut buf, 300); // 2 bytes
    put_varint(&mut buf, 5); // 1 byte

    let mut rd = reader(buf);
    assert_eq!(rd.read_varint_bounded(10).unwrap(), (300, 2));
    assert_eq!(rd.read_varint_bounded(10).unwrap(), (5, 1));
}

#[test]
fn bounded_varint_fails_when_budget_runs_out() {
    let mut rd = reader(vec![0x80, 0x80, 0x80, 0x01]);
    let err = rd.read_varint_bounded(2).unwrap_err();
    assert!(matches!(err, MmkvError::VarintTooLong { max_bytes: 2 }));
}

// ---------------------------------------------------------------------------
// Exact-consumption invariant for value containers
// ---------------------------------------------------------------------------

#[test]
fn value_container_consumes_exactly_its_declared_length() {
    // Inner field "hi" (3 bytes) inside a 6-byte container: the reader
    // must skip the 3 reserved trailing bytes and land exactly on the
    // container boundary.
    let mut inner = Vec::new();
    put_field(&mut inner, b"hi");
    inner.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

    let mut buf = Vec::new();
    put_field(&mut buf, &inner);
    put_varint(&mut buf, 7); // next value, proves the cursor is aligned

    let mut rd = reader(buf);
    let before = rd.offset();
    let value = rd.read_length_delimited_value().unwrap();

    assert_eq!(value, "hi");
    assert_eq!(rd.offset(), before + 1 + 6);
    assert_eq!(rd.read_varint().unwrap(), 7);
}

#[test]
fn value_container_with_no_slack_needs_no_skip() {
    let mut inner = Vec::new();
    put_field(&mut inner, b"exact");

    let mut buf = Vec::new();
    put_field(&mut buf, &inner);

    let mut rd = reader(buf);
    assert_eq!(rd.read_length_delimited_value().unwrap(), "exact");
    assert!(rd.is_eof());
}

#[test]
fn zero_length_container_is_empty_value() {
    let mut rd = reader(vec![0x00]);
    assert_eq!(rd.read_length_delimited_value().unwrap(), "");
    assert!(rd.is_eof());
}

#[test]
fn container_truncated_by_payload_end_fails() {
    // Container declares 10 bytes but the payload ends after 2.
    let mut buf = Vec::new();
    put_varint(&mut buf, 10);
    buf.extend_from_slice(&[0x01, 0x41]);

    let mut rd = reader(buf);
    assert!(rd.read_length_delimited_value().is_err());
}

// ---------------------------------------------------------------------------
// Strings and skipping
// ---------------------------------------------------------------------------

#[test]
fn read_string_returns_raw_content() {
    let mut buf = Vec::new();
    put_field(&mut buf, b"world");
    put_field(&mut buf, b"");

    let mut rd = reader(buf);
    assert_eq!(rd.read_string().unwrap(), "world");
    assert_eq!(rd.read_string().unwrap(), "");
}

#[test]
fn non_utf8_string_content_is_not_an_error() {
    let mut buf = Vec::new();
    put_field(&mut buf, &[0xFF, 0xFE, 0x41]);

    let mut rd = reader(buf);
    let s = rd.read_string().unwrap();
    assert!(s.ends_with('A'));
    assert!(rd.is_eof());
}

#[test]
fn skip_container_discards_and_advances() {
    let mut buf = Vec::new();
    put_field(&mut buf, b"ignored");
    put_varint(&mut buf, 9);

    let mut rd = reader(buf);
    rd.skip_container().unwrap();
    assert_eq!(rd.read_varint().unwrap(), 9);
}

#[test]
fn bytes_available_tracks_the_cursor() {
    let mut rd = reader(vec![0x01, 0x02, 0x03]);
    assert_eq!(rd.bytes_available(), 3);
    rd.read_exact(2).unwrap();
    assert_eq!(rd.bytes_available(), 1);
    assert!(!rd.is_eof());
    rd.read_exact(1).unwrap();
    assert!(rd.is_eof());
}
