/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::handshake::{HandshakeCoalesceError, HandshakeCoalescer, HandshakeMessage};
use super::version::{ProtocolVersion, RawVersion};

pub const RECORD_HEADER_LEN: usize = 5;

/// `ContentType` per RFC 5246 §6.2.1, with pass-through for anything else
/// (this parser never rejects a record purely for carrying an unrecognized
/// content type — that judgment belongs to the caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
    Unknown(u8),
}

impl ContentType {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            other => ContentType::Unknown(other),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Unknown(v) => *v,
        }
    }
}

/// The outer 5-byte record header, or the SSL 2.0 unified-ClientHello
/// equivalent.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub content_type: ContentType,
    pub version: ProtocolVersion,
    /// `-1` when the header could not be determined at all.
    pub length: i32,
}

impl RecordHeader {
    pub const fn unknown() -> Self {
        RecordHeader {
            content_type: ContentType::Unknown(0),
            version: ProtocolVersion::NONE,
            length: -1,
        }
    }
}

/// Recognize a 5-byte SSL3/TLS record header, or fall back to the SSL 2.0
/// unified ClientHello framing. Total function: never panics, never
/// indexes out of bounds, and has no notion of "not enough data yet" beyond
/// `length == -1` (the caller is expected to already know it has at least 5
/// bytes, or to treat fewer than 5 as `IncompleteFrame` itself — see
/// `g3-dpi`'s `try_get_frame_header`).
pub fn read_record_header(frame: &[u8]) -> RecordHeader {
    if frame.len() < RECORD_HEADER_LEN {
        return RecordHeader::unknown();
    }

    let raw_version = RawVersion::new(frame[1], frame[2]);
    if frame[1] == 3 || raw_version.is_tlcp() {
        let content_type = ContentType::from_u8(frame[0]);
        let version = ProtocolVersion::from_raw(raw_version);
        let length = ((frame[3] as i32) << 8) | frame[4] as i32;
        return RecordHeader {
            content_type,
            version,
            length,
        };
    }

    // SSL 2.0 unified ClientHello: { length-prefix; msg_type=1; major=3; ... }
    if frame[2] == 1 && frame[3] == 3 {
        let length = if frame[0] & 0x80 != 0 {
            (((frame[0] & 0x7f) as i32) << 8 | frame[1] as i32) + 2
        } else {
            (((frame[0] & 0x3f) as i32) << 8 | frame[1] as i32) + 3
        };
        if length > 20 && length < 1000 {
            return RecordHeader {
                content_type: ContentType::Handshake,
                version: ProtocolVersion::SSL2,
                length,
            };
        }
    }

    RecordHeader::unknown()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("need {0} more bytes to read a record header")]
    NeedMoreData(usize),
    #[error("record header is not a recognizable SSL3/TLS header")]
    UnsupportedHeader,
}

/// A single SSL3/TLS record, tracking how much of its body has been handed
/// off to a handshake consumer so far.
///
/// `Record` only covers the SSL3/TLS family (`frame[1] == 3`); the SSL 2.0
/// unified ClientHello is a different wire shape entirely and is recognized
/// directly by the top-level entry point instead of through this type.
pub struct Record<'a> {
    header: RecordHeader,
    body: &'a [u8],
    consumed: usize,
}

impl<'a> Record<'a> {
    pub fn parse(frame: &'a [u8]) -> Result<Self, RecordParseError> {
        if frame.len() < RECORD_HEADER_LEN {
            return Err(RecordParseError::NeedMoreData(
                RECORD_HEADER_LEN - frame.len(),
            ));
        }
        let header = read_record_header(frame);
        if header.length < 0 || header.version == ProtocolVersion::SSL2 {
            return Err(RecordParseError::UnsupportedHeader);
        }
        let declared = header.length as usize;
        let available = frame.len() - RECORD_HEADER_LEN;
        let body_len = declared.min(available);
        Ok(Record {
            header,
            body: &frame[RECORD_HEADER_LEN..RECORD_HEADER_LEN + body_len],
            consumed: 0,
        })
    }

    pub fn header(&self) -> RecordHeader {
        self.header
    }

    /// The body bytes currently available for this record (bounded by
    /// whatever of the declared length has actually arrived).
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// True once every body byte currently held by this record has been
    /// handed off to a consumer (e.g. `consume_handshake`).
    pub fn consume_done(&self) -> bool {
        self.consumed >= self.body.len()
    }

    /// Feed whatever unconsumed body bytes remain in this record into
    /// `coalescer`. Returns `Ok(Some(message))` once `coalescer` has
    /// assembled a complete handshake message (possibly spanning more than
    /// this one record), `Ok(None)` if more records are still needed.
    pub fn consume_handshake(
        &mut self,
        coalescer: &mut HandshakeCoalescer,
    ) -> Result<Option<HandshakeMessage>, HandshakeCoalesceError> {
        if self.header.content_type != ContentType::Handshake {
            return Err(HandshakeCoalesceError::NotHandshake);
        }
        let remaining = &self.body[self.consumed..];
        let (msg, used) = coalescer.push(remaining)?;
        self.consumed += used;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_is_unknown() {
        let header = read_record_header(&[0x16, 0x03]);
        assert_eq!(header.length, -1);
    }

    #[test]
    fn tls12_handshake_header() {
        let frame = [0x16, 0x03, 0x03, 0x00, 0x05, 0xaa];
        let header = read_record_header(&frame);
        assert_eq!(header.content_type, ContentType::Handshake);
        assert_eq!(header.version, ProtocolVersion::TLS12);
        assert_eq!(header.length, 5);
    }

    #[test]
    fn tlcp_handshake_header() {
        let frame = [0x16, 0x01, 0x01, 0x00, 0x65, 0xaa];
        let header = read_record_header(&frame);
        assert_eq!(header.content_type, ContentType::Handshake);
        assert_eq!(header.version, ProtocolVersion::NONE);
        assert_eq!(header.length, 0x65);
    }

    #[test]
    fn ssl2_unified_client_hello() {
        let frame = [0x80, 0x2e, 0x01, 0x03, 0x01];
        let header = read_record_header(&frame);
        assert_eq!(header.content_type, ContentType::Handshake);
        assert_eq!(header.version, ProtocolVersion::SSL2);
        assert_eq!(header.length, (0x2e_i32) + 2);
    }

    #[test]
    fn ssl2_length_outside_sanity_window_is_unknown() {
        // 2-byte prefix, length decodes to 5: outside (20, 1000)
        let frame = [0x80, 0x03, 0x01, 0x03, 0x01];
        let header = read_record_header(&frame);
        assert_eq!(header.length, -1);
    }

    #[test]
    fn unrecognized_shape_is_unknown() {
        let frame = [0x00, 0x00, 0x00, 0x00, 0x00];
        let header = read_record_header(&frame);
        assert_eq!(header.length, -1);
    }

    #[test]
    fn record_parse_needs_more_data() {
        assert_eq!(
            Record::parse(&[0x16, 0x03]).unwrap_err(),
            RecordParseError::NeedMoreData(3)
        );
    }

    #[test]
    fn record_tracks_partial_body_availability() {
        // header declares 10 bytes of body but only 3 are in hand
        let frame = [0x16, 0x03, 0x03, 0x00, 0x0a, 0x01, 0x02, 0x03];
        let record = Record::parse(&frame).unwrap();
        assert_eq!(record.header().length, 10);
        assert!(!record.consume_done());
    }
}
