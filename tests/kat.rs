//! Known-answer and malformed-input tests at the packet level.

use bytes::Bytes;

use sync_snmp::transport::ResponseBuilder;
use sync_snmp::{oid, Client, ClientConfig, Error, Message, MockTransport, Value, Version};

fn v1_client(mock: &MockTransport) -> Client<MockTransport> {
    Client::with_transport(
        mock.clone(),
        ClientConfig {
            version: Version::V1,
            community: Bytes::from_static(b"public"),
            request_id_seed: Some(11),
        },
    )
}

/// A v1 GET for sysDescr.0 with community "public" starts with the classic
/// header bytes, independent of the generated request id.
#[test]
fn v1_get_known_prefix() {
    let mock = MockTransport::new();
    mock.queue(ResponseBuilder::new().version(Version::V1).varbind(
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        Value::OctetString(Bytes::from_static(b"x")),
    ));
    v1_client(&mock).get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).unwrap();

    let packet = mock.requests()[0].clone();
    assert_eq!(packet[0], 0x30);
    assert_eq!(packet[1] as usize, packet.len() - 2);
    assert_eq!(&packet[2..5], &[0x02, 0x01, 0x00]); // version v1
    assert_eq!(&packet[5..7], &[0x04, 0x06]);
    assert_eq!(&packet[7..13], b"public");
    assert_eq!(packet[13], 0xA0); // GetRequest
    // Request id is a 4-byte integer right after the PDU header.
    assert_eq!(&packet[15..17], &[0x02, 0x04]);
    // Varbind tail: OID followed by NULL.
    assert_eq!(
        &packet[packet.len() - 12..],
        &[0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00, 0x05, 0x00]
    );
}

#[test]
fn every_truncation_of_a_response_fails_cleanly() {
    let full = ResponseBuilder::new()
        .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(99))
        .build(21);
    assert!(Message::unmarshal(full.clone()).is_ok());
    for cut in 0..full.len() {
        assert!(
            Message::unmarshal(full.slice(..cut)).is_err(),
            "{}-byte prefix should not parse",
            cut
        );
    }
}

#[test]
fn response_with_unknown_value_tag_is_rejected() {
    // Hand-built response whose varbind value uses unassigned tag 0x47.
    #[rustfmt::skip]
    let packet: &[u8] = &[
        0x30, 0x1D,
        0x02, 0x01, 0x01,
        0x04, 0x02, b'p', b'b',
        0xA2, 0x14,
        0x02, 0x01, 0x05,
        0x02, 0x01, 0x00,
        0x02, 0x01, 0x00,
        0x30, 0x09,
        0x30, 0x07,
        0x06, 0x02, 0x2B, 0x06,
        0x47, 0x01, 0xFF,
    ];
    let err = Message::unmarshal(Bytes::copy_from_slice(packet)).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode {
            kind: sync_snmp::DecodeErrorKind::UnknownTag(0x47),
            ..
        }
    ));
}

#[test]
fn garbage_responses_surface_as_errors_not_panics() {
    let cases: &[&[u8]] = &[
        b"",
        b"\x00",
        b"\x30\x80",
        b"\x30\x7f\x02\x01",
        b"\x04\x03abc",
        b"\x30\x05\x02\x01\x00\x04\xff",
    ];
    for case in cases {
        let mock = MockTransport::new();
        mock.queue_raw(Bytes::copy_from_slice(case));
        assert!(
            v1_client(&mock).get(&oid!(1, 3, 6, 1)).is_err(),
            "case {:02x?} should error",
            case
        );
    }
}

#[test]
fn agent_error_status_is_surfaced() {
    // noSuchName(2) at index 1, the v1 way of reporting a missing OID.
    let mock = MockTransport::new();
    mock.queue(
        ResponseBuilder::new()
            .version(Version::V1)
            .error_status(2)
            .error_index(1)
            .varbind(oid!(1, 3, 6, 1, 99), Value::Null),
    );

    let mut c = v1_client(&mock);
    let response = c
        .request(sync_snmp::PduType::GetRequest, &[oid!(1, 3, 6, 1, 99)])
        .unwrap();
    assert_eq!(response.error_status, 2);
    assert_eq!(response.error_index, 1);
    assert_eq!(response.varbinds[0].value, Value::Null);
}
