/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

//! The TLS sniffing contract: take whatever bytes of a connection have
//! arrived so far and report what can already be told about it — record
//! type, negotiated/offered versions, SNI, ALPN, cipher suites, alerts —
//! without terminating TLS or holding any state across calls.

mod application_protocol;
mod frame_info;
mod hello;
mod options;

pub use application_protocol::{classify_alpn, ApplicationProtocolSet};
pub use frame_info::{FrameInfo, ParsingStatus};
pub use options::ProcessingOptions;

pub use g3_codec::tls::{create_alert_frame, AlertDescription, AlertLevel};

use g3_codec::tls::{
    decode_alert, read_record_header, ContentType, ExtensionType, HandshakeType, ProtocolVersion,
    RawVersion, RecordHeader, RECORD_HEADER_LEN,
};
use g3_types::net::TlsServerName;

/// Read just the record header, without attempting to interpret the body.
/// Returns `(header, false)` when fewer than 5 bytes are available, or when
/// the bytes present don't match any recognized SSL3/TLS/SSL2 shape.
pub fn try_get_frame_header(frame: &[u8]) -> (RecordHeader, bool) {
    let header = read_record_header(frame);
    (header, header.length >= 0)
}

/// Total on-wire size of the record at the front of `frame`, including its
/// 5-byte header. Returns `-1` if there aren't enough bytes to read a header,
/// or if the header's major version byte is below 3 — this intentionally
/// excludes both the unrecognized case and the SSL 2.0 unified ClientHello,
/// which has no fixed-position length field to report this way.
pub fn get_frame_size(frame: &[u8]) -> i32 {
    if frame.len() < RECORD_HEADER_LEN {
        return -1;
    }
    if frame[1] < 3 {
        return -1;
    }
    let header = read_record_header(frame);
    if header.length < 0 {
        return -1;
    }
    RECORD_HEADER_LEN as i32 + header.length
}

/// Decode SNI, ALPN, SupportedVersions, cipher suites, and Alert details out
/// of one record, invoking `callback` once per extension TLV encountered
/// along the way (in wire order, including unrecognized extension types).
///
/// `complete` is true once every byte the outer record declares has actually
/// arrived in `frame`; it says nothing about whether what did arrive parsed
/// successfully. `info.status` is the place to look for that: it only ever
/// escalates in severity within this one call, so a later benign step can
/// never paper over an earlier structural failure.
pub fn try_get_frame_info(
    frame: &[u8],
    options: ProcessingOptions,
    mut callback: impl FnMut(&FrameInfo, ExtensionType, &[u8]),
) -> (FrameInfo, bool) {
    let mut info = FrameInfo::empty();

    if frame.len() < RECORD_HEADER_LEN {
        info.status = ParsingStatus::IncompleteFrame;
        return (info, false);
    }

    let header = read_record_header(frame);
    info.header = header;
    info.supported_versions.insert(header.version);

    if header.version == ProtocolVersion::SSL2 {
        // Recognizing the unified ClientHello shape is itself the whole
        // parse: there is no separate hello body to wait for.
        info.handshake_type = Some(HandshakeType::ClientHello);
        info.supported_versions
            .insert(ProtocolVersion::from_raw(RawVersion::new(3, frame[4])));
        info.status = ParsingStatus::Ok;
        return (info, true);
    }

    if header.length < 0 {
        info.status = ParsingStatus::UnsupportedFrame;
        return (info, false);
    }

    if header.content_type == ContentType::Alert {
        return handle_alert(frame, &header, &mut info);
    }

    if header.content_type != ContentType::Handshake {
        info.status = ParsingStatus::UnsupportedFrame;
        return (info, false);
    }

    if frame.len() <= RECORD_HEADER_LEN {
        info.status = ParsingStatus::IncompleteFrame;
        return (info, false);
    }

    let handshake_type = HandshakeType::from_u8(frame[RECORD_HEADER_LEN]);
    info.handshake_type = Some(handshake_type);

    let declared_end = RECORD_HEADER_LEN + header.length as usize;
    let complete = frame.len() >= declared_end;
    info.status = if complete {
        ParsingStatus::Ok
    } else {
        ParsingStatus::IncompleteFrame
    };

    let is_hello = matches!(
        handshake_type,
        HandshakeType::ClientHello | HandshakeType::ServerHello
    );
    let hello_ok = if is_hello {
        let handshake_slice = &frame[RECORD_HEADER_LEN..declared_end.min(frame.len())];
        match hello::try_parse_hello(
            handshake_slice,
            header.length,
            frame[1],
            frame[2],
            &mut info,
            options,
            &mut callback,
        ) {
            Ok(extensions_complete) => {
                if !extensions_complete {
                    // An extension's own declared length ran past the list:
                    // the hello isn't malformed, but it isn't fully read either.
                    info.status.escalate(ParsingStatus::IncompleteFrame);
                }
                extensions_complete
            }
            Err(status) => {
                info.status.escalate(status);
                false
            }
        }
    } else {
        true
    };

    (info, complete && hello_ok)
}

fn handle_alert(frame: &[u8], header: &RecordHeader, info: &mut FrameInfo) -> (FrameInfo, bool) {
    const ALERT_BODY_LEN: usize = 2;
    if header.length < ALERT_BODY_LEN as i32 || frame.len() < RECORD_HEADER_LEN + ALERT_BODY_LEN {
        info.status = ParsingStatus::IncompleteFrame;
        return (info.clone(), false);
    }
    let body = &frame[RECORD_HEADER_LEN..RECORD_HEADER_LEN + ALERT_BODY_LEN];
    match decode_alert(body) {
        Ok((level, description)) => {
            info.alert_level = Some(level);
            info.alert_description = Some(description);
            info.status = ParsingStatus::Ok;
            (info.clone(), true)
        }
        Err(_) => {
            info.status = ParsingStatus::IncompleteFrame;
            (info.clone(), false)
        }
    }
}

/// Convenience wrapper over [`try_get_frame_info`] for callers that only
/// want the SNI host name, if any.
pub fn get_server_name(frame: &[u8]) -> Option<TlsServerName> {
    let (info, _) = try_get_frame_info(frame, ProcessingOptions::SERVER_NAME, |_, _, _| {});
    info.target_name
}

/// Convenience wrapper over [`try_get_frame_info`] for callers that only
/// want to know whether this record is an Alert, and if so what it says.
/// The trailing `bool` mirrors `try_get_frame_info`'s `complete`.
pub fn try_get_alert_info(frame: &[u8]) -> (Option<AlertLevel>, Option<AlertDescription>, bool) {
    let (info, complete) = try_get_frame_info(frame, ProcessingOptions::NONE, |_, _, _| {});
    (info.alert_level, info.alert_description, complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_hello_with_extensions(extensions: &[u8]) -> Vec<u8> {
        let mut body = vec![0x03, 0x03]; // TLS 1.2 legacy_version
        body.extend_from_slice(&[0u8; 32]); // random
        body.push(0); // no session id
        body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]); // one cipher suite
        body.extend_from_slice(&[0x01, 0x00]); // one compression method, null
        body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
        body.extend_from_slice(extensions);

        let mut msg = vec![0x01]; // ClientHello
        msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        msg.extend_from_slice(&body);

        let mut frame = vec![0x16, 0x03, 0x01];
        frame.extend_from_slice(&(msg.len() as u16).to_be_bytes());
        frame.extend_from_slice(&msg);
        frame
    }

    fn client_hello_with_sni(host: &str) -> Vec<u8> {
        let mut sni_entry = Vec::new();
        sni_entry.push(0u8); // host_name
        sni_entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
        sni_entry.extend_from_slice(host.as_bytes());

        let mut sni_ext_value = Vec::new();
        sni_ext_value.extend_from_slice(&(sni_entry.len() as u16).to_be_bytes());
        sni_ext_value.extend_from_slice(&sni_entry);

        let mut extensions = Vec::new();
        extensions.extend_from_slice(&[0x00, 0x00]); // server_name
        extensions.extend_from_slice(&(sni_ext_value.len() as u16).to_be_bytes());
        extensions.extend_from_slice(&sni_ext_value);

        client_hello_with_extensions(&extensions)
    }

    #[test]
    fn decodes_sni_from_a_complete_client_hello() {
        let frame = client_hello_with_sni("example.com");
        let (info, complete) =
            try_get_frame_info(&frame, ProcessingOptions::ALL, |_, _, _| {});
        assert!(complete);
        assert_eq!(info.status, ParsingStatus::Ok);
        assert_eq!(info.handshake_type, Some(HandshakeType::ClientHello));
        assert_eq!(info.target_name.unwrap().as_ref(), "example.com");
    }

    #[test]
    fn get_server_name_matches_try_get_frame_info() {
        let frame = client_hello_with_sni("xn--fsq.com");
        assert_eq!(get_server_name(&frame).unwrap().as_ref(), "中.com");
    }

    #[test]
    fn callback_sees_every_extension_in_order() {
        let frame = client_hello_with_sni("example.com");
        let mut seen = Vec::new();
        let _ = try_get_frame_info(&frame, ProcessingOptions::ALL, |_, ext_type, _| {
            seen.push(ext_type);
        });
        assert_eq!(seen, vec![ExtensionType::ServerName]);
    }

    #[test]
    fn incomplete_frame_is_reported_as_such() {
        let frame = client_hello_with_sni("example.com");
        let truncated = &frame[..frame.len() - 5];
        let (info, complete) =
            try_get_frame_info(truncated, ProcessingOptions::ALL, |_, _, _| {});
        assert!(!complete);
        assert_eq!(info.status, ParsingStatus::IncompleteFrame);
    }

    #[test]
    fn extension_short_read_forces_incomplete_without_invalid_frame() {
        // declares ext_len = 16 but only 2 bytes of extension data follow
        let extensions = [0x00, 0x00, 0x00, 0x10, 0xaa, 0xbb];
        let frame = client_hello_with_extensions(&extensions);
        let (info, complete) =
            try_get_frame_info(&frame, ProcessingOptions::ALL, |_, _, _| {});
        assert!(!complete);
        assert_eq!(info.status, ParsingStatus::IncompleteFrame);
    }

    #[test]
    fn alert_record_is_decoded() {
        let frame = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x46];
        let (level, description, complete) = try_get_alert_info(&frame);
        assert!(complete);
        assert_eq!(level, Some(AlertLevel::Fatal));
        assert_eq!(description, Some(AlertDescription::ProtocolVersion));
    }

    #[test]
    fn ssl2_unified_client_hello_derives_tls10() {
        let frame = [0x80, 0x2e, 0x01, 0x03, 0x01];
        let (info, _) = try_get_frame_info(&frame, ProcessingOptions::NONE, |_, _, _| {});
        assert_eq!(info.handshake_type, Some(HandshakeType::ClientHello));
        assert!(info.supported_versions.contains(ProtocolVersion::SSL2));
        assert!(info.supported_versions.contains(ProtocolVersion::TLS10));
    }

    #[test]
    fn application_data_is_unsupported() {
        let frame = [0x17, 0x03, 0x03, 0x00, 0x01, 0xaa];
        let (info, ok) = try_get_frame_info(&frame, ProcessingOptions::NONE, |_, _, _| {});
        assert!(!ok);
        assert_eq!(info.status, ParsingStatus::UnsupportedFrame);
    }

    #[test]
    fn get_frame_size_reports_header_plus_body() {
        let frame = client_hello_with_sni("example.com");
        assert_eq!(get_frame_size(&frame), frame.len() as i32);
    }

    #[test]
    fn get_frame_size_rejects_ssl2_and_short_input() {
        let ssl2 = [0x80, 0x2e, 0x01, 0x03, 0x01];
        assert_eq!(get_frame_size(&ssl2), -1);
        assert_eq!(get_frame_size(&[0x16, 0x03]), -1);
    }
}
