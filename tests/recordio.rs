use std::sync::Arc;

use hybrid_row::prelude::*;
use hybrid_row::recordio;
use hybrid_row::schema::{RECORD_SCHEMA_ID, SEGMENT_SCHEMA_ID, system_resolver};

fn payload_row() -> Vec<u8> {
    let id = SchemaId::new(1);
    let mut schema = Schema::new("point", id);
    schema.properties.push(Property::new(
        "x",
        PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
    ));
    schema.properties.push(Property::new(
        "y",
        PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
    ));
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    let resolver: Arc<dyn LayoutResolver> = Arc::new(LayoutResolverNamespace::new(ns, None));
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let root = RowCursor::create(&row);
    row.write_fixed_i32(&root, layout.try_find("x").unwrap(), 10).unwrap();
    row.write_fixed_i32(&root, layout.try_find("y").unwrap(), -3).unwrap();
    row.as_bytes().to_vec()
}

fn framed_stream(payload: &[u8]) -> (Vec<u8>, usize, usize) {
    let resolver = system_resolver();

    let mut segment_row = RowBuffer::new();
    let segment_layout = resolver.resolve(SEGMENT_SCHEMA_ID);
    segment_row.init_layout(HybridRowVersion::V1, &segment_layout, resolver.clone());
    let mut segment = Segment::new(Some("test stream".to_owned()), None);
    segment.write(&mut segment_row).unwrap();
    assert_eq!(segment.length as u32, segment_row.length());

    let mut record_row = RowBuffer::new();
    let record_layout = resolver.resolve(RECORD_SCHEMA_ID);
    record_row.init_layout(HybridRowVersion::V1, &record_layout, resolver.clone());
    let record = recordio::Record::new(payload);
    record.write(&mut record_row).unwrap();

    let mut stream = Vec::new();
    stream.extend_from_slice(segment_row.as_bytes());
    stream.extend_from_slice(record_row.as_bytes());
    stream.extend_from_slice(payload);
    (
        stream,
        segment_row.length() as usize,
        record_row.length() as usize,
    )
}

#[test]
fn parses_segment_then_record() {
    let payload = payload_row();
    let (stream, segment_len, record_len) = framed_stream(&payload);

    let mut parser = RecordIoParser::new();

    let (production, consumed) = parser.process(&stream);
    let Production::Segment(bytes) = production.unwrap() else {
        panic!("expected a segment");
    };
    assert_eq!(bytes.len(), segment_len);
    assert_eq!(consumed, segment_len);
    assert!(parser.have_segment());
    assert_eq!(parser.segment().comment.as_deref(), Some("test stream"));

    let (production, consumed) = parser.process(&stream[segment_len..]);
    let Production::Record(bytes) = production.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(bytes, payload.as_slice());
    assert_eq!(consumed, record_len + payload.len());
}

#[test]
fn short_buffers_request_more_bytes() {
    let payload = payload_row();
    let (stream, _, _) = framed_stream(&payload);

    let mut parser = RecordIoParser::new();

    // An empty push reports the minimal segment row size.
    let (production, consumed) = parser.process(&[]);
    let Production::None { need } = production.unwrap() else {
        panic!("expected no production");
    };
    assert!(need > 0);
    assert_eq!(consumed, 0);

    // A short prefix still cannot produce anything.
    let (production, consumed) = parser.process(&stream[..need as usize]);
    let Production::None { need: more } = production.unwrap() else {
        panic!("expected no production");
    };
    assert!(more as usize > need as usize);
    assert_eq!(consumed, 0);

    // The whole stream parses.
    let (production, consumed) = parser.process(&stream);
    assert!(matches!(production.unwrap(), Production::Segment(_)));
    let (production, _) = parser.process(&stream[consumed..]);
    assert!(matches!(production.unwrap(), Production::Record(_)));
}

#[test]
fn corrupted_payload_is_rejected() {
    let payload = payload_row();
    let (mut stream, segment_len, _) = framed_stream(&payload);

    // Flip one bit in the payload.
    let last = stream.len() - 1;
    stream[last] ^= 0x10;

    let mut parser = RecordIoParser::new();
    let (production, _) = parser.process(&stream);
    assert!(matches!(production.unwrap(), Production::Segment(_)));

    let (production, _) = parser.process(&stream[segment_len..]);
    assert_eq!(production.unwrap_err(), Error::InvalidRow);
}

#[test]
fn bad_version_byte_is_rejected() {
    let payload = payload_row();
    let (mut stream, segment_len, _) = framed_stream(&payload);

    // Corrupt the record row's version byte.
    stream[segment_len] = 0x42;

    let mut parser = RecordIoParser::new();
    let (production, _) = parser.process(&stream);
    assert!(matches!(production.unwrap(), Production::Segment(_)));

    let (production, _) = parser.process(&stream[segment_len..]);
    assert_eq!(production.unwrap_err(), Error::InvalidRow);
}

#[test]
fn unknown_header_schema_is_rejected() {
    let payload = payload_row();
    let (mut stream, segment_len, _) = framed_stream(&payload);

    // Point the record row header at a schema the stream cannot contain.
    stream[segment_len + 1..segment_len + 5].copy_from_slice(&77i32.to_le_bytes());

    let mut parser = RecordIoParser::new();
    let (production, _) = parser.process(&stream);
    assert!(matches!(production.unwrap(), Production::Segment(_)));

    let (production, _) = parser.process(&stream[segment_len..]);
    assert_eq!(production.unwrap_err(), Error::InvalidRow);
}
