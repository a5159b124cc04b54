/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use g3_codec::tls::{
    Cursor, ExtensionIter, ExtensionType, HandshakeMessage, HandshakeType, ProtocolVersion,
    RawVersion,
};
use g3_types::net::TlsServerName;

use super::application_protocol::{classify_alpn, ApplicationProtocolSet};
use super::frame_info::{FrameInfo, ParsingStatus};
use super::options::ProcessingOptions;

/// Minimum hello body size: `u16 version` (2) + `32B random` + `session_id_len`
/// (1) + `cipher_suites_len` (2) + `compression_methods_len` (1) + one cipher
/// pair (2) + one compression method (1) = 44.
const MIN_HELLO_BODY: i32 = 44;

/// `msg_type` (1) + `u24 length` (3) + a few bytes of margin before this
/// parser will even look at `length`'s value.
const MIN_HANDSHAKE_SLICE: usize = 7;

/// `{ u8 major; u8 minor; }` client-hello/server-hello legacy_version pairs
/// TLS 1.0 or later, plus the TLCP variant that reuses this same hello body
/// shape at `major == 1`.
fn eligible_for_hello_parsing(major: u8, minor: u8) -> bool {
    (major == 3 && minor >= 1) || RawVersion::new(major, minor).is_tlcp()
}

/// Outcome of walking one hello's extension list.
enum ExtensionWalkResult {
    /// Every extension was read; none overran the declared list.
    Complete,
    /// A declared `ext_len` ran past the list. The header and whatever
    /// extensions were read before it remain usable, but the frame is not
    /// `complete`.
    ShortRead,
    /// An extension this parser decodes was itself malformed.
    Invalid,
}

/// Parses a ClientHello or ServerHello directly out of
/// `frame[5 .. min(5+header.length, frame.len)]`, `record_body_len` being
/// `header.length` itself. `major`/`minor` are the outer record's version
/// bytes (used only to decide eligibility; TLCP never maps to a named
/// `ProtocolVersion` so it can't be read back off `info.header.version`).
///
/// A byte-availability check runs before the structural minimum-size check:
/// a slice too short to safely read past the handshake header is reported as
/// `IncompleteFrame` even when its eventual declared length would also be
/// too small to hold a hello — there is no way to tell the two apart with
/// fewer than `MIN_HANDSHAKE_SLICE` bytes in hand.
///
/// Returns `Ok(true)` once the hello (and, if present, every one of its
/// extensions) parsed in full, `Ok(false)` if an extension's own declared
/// length ran past what's available (the hello is still not malformed, but
/// the caller's `complete` must be `false`), or `Err(status)` on a hard
/// failure.
pub(super) fn try_parse_hello(
    handshake_slice: &[u8],
    record_body_len: i32,
    major: u8,
    minor: u8,
    info: &mut FrameInfo,
    options: ProcessingOptions,
    callback: &mut dyn FnMut(&FrameInfo, ExtensionType, &[u8]),
) -> Result<bool, ParsingStatus> {
    if !eligible_for_hello_parsing(major, minor) {
        return Ok(true);
    }

    if handshake_slice.len() < MIN_HANDSHAKE_SLICE {
        return Err(ParsingStatus::IncompleteFrame);
    }
    if record_body_len - 4 < MIN_HELLO_BODY {
        return Err(ParsingStatus::InvalidFrame);
    }

    let hello_length = u32::from_be_bytes([
        0,
        handshake_slice[1],
        handshake_slice[2],
        handshake_slice[3],
    ]) as i32;
    if hello_length < MIN_HELLO_BODY || hello_length > record_body_len - 4 {
        return Err(ParsingStatus::InvalidFrame);
    }

    let total = 4 + hello_length as usize;
    if handshake_slice.len() < total {
        return Err(ParsingStatus::IncompleteFrame);
    }

    let body = &handshake_slice[4..total];
    info.supported_versions
        .insert(ProtocolVersion::from_raw(RawVersion::new(body[0], body[1])));

    let msg = HandshakeMessage::try_parse_fragment(&handshake_slice[..total])
        .map_err(|_| ParsingStatus::InvalidFrame)?;

    match msg.msg_type() {
        HandshakeType::ClientHello => {
            let ch = msg
                .parse_client_hello()
                .map_err(|_| ParsingStatus::InvalidFrame)?;
            if options.contains(ProcessingOptions::CIPHER_SUITES) {
                info.cipher_suites = decode_cipher_suites(ch.cipher_suites);
            }
            let Some(extensions) = ch.extensions else {
                return Ok(true);
            };
            match walk_extensions(ExtensionIter::new(extensions), options, info, callback) {
                ExtensionWalkResult::Complete => Ok(true),
                ExtensionWalkResult::ShortRead => Ok(false),
                ExtensionWalkResult::Invalid => Err(ParsingStatus::InvalidFrame),
            }
        }
        HandshakeType::ServerHello => {
            let sh = msg
                .parse_server_hello()
                .map_err(|_| ParsingStatus::InvalidFrame)?;
            match walk_extensions(sh.ext_iter(), options, info, callback) {
                ExtensionWalkResult::Complete => Ok(true),
                ExtensionWalkResult::ShortRead => Ok(false),
                ExtensionWalkResult::Invalid => Err(ParsingStatus::InvalidFrame),
            }
        }
        // the caller only dispatches here for these two handshake types
        _ => Ok(true),
    }
}

fn walk_extensions(
    ext_iter: ExtensionIter<'_>,
    options: ProcessingOptions,
    info: &mut FrameInfo,
    callback: &mut dyn FnMut(&FrameInfo, ExtensionType, &[u8]),
) -> ExtensionWalkResult {
    for item in ext_iter {
        let (ext_type, body) = match item {
            Ok(pair) => pair,
            // declared ext_len ran past the list: stop, don't fail the hello
            Err(_) => return ExtensionWalkResult::ShortRead,
        };

        let mut invalid = false;
        match ext_type {
            ExtensionType::ServerName if options.contains(ProcessingOptions::SERVER_NAME) => {
                match TlsServerName::from_extension_value(body) {
                    Ok(name) => info.target_name = Some(name),
                    Err(g3_types::net::TlsServerNameParseError::NotUtf8) => {}
                    Err(_) => invalid = true,
                }
            }
            ExtensionType::ApplicationLayerProtocolNegotiation
                if options.contains(ProcessingOptions::APPLICATION_PROTOCOL) =>
            {
                if let Some(set) = decode_alpn(body) {
                    info.application_protocols.insert(set);
                }
            }
            ExtensionType::SupportedVersions if options.contains(ProcessingOptions::VERSIONS) => {
                match decode_supported_versions(body) {
                    Some(versions) => info.supported_versions.insert(versions),
                    None => invalid = true,
                }
            }
            _ => {}
        }

        callback(info, ext_type, body);
        if invalid {
            return ExtensionWalkResult::Invalid;
        }
    }
    ExtensionWalkResult::Complete
}

/// `ProtocolVersionList`: `{ opaque<0..2^8-2>; }` — a 1-byte length prefix
/// followed by a list of `{ u8 major; u8 minor; }` entries. The outer length
/// must exactly match what's left of the extension value; a mismatch fails
/// the hello, matching the `SupportedVersions` handling in the ClientHello
/// and ServerHello bodies.
fn decode_supported_versions(body: &[u8]) -> Option<ProtocolVersion> {
    let cursor = Cursor::new(body);
    let (list, rest) = cursor.take_opaque1().ok()?;
    if !rest.is_empty() {
        return None;
    }
    let mut versions = ProtocolVersion::NONE;
    let mut walker = Cursor::new(list);
    while !walker.is_empty() {
        let (major, next) = walker.read_u8().ok()?;
        let (minor, next) = next.read_u8().ok()?;
        versions.insert(ProtocolVersion::from_raw(RawVersion::new(major, minor)));
        walker = next;
    }
    Some(versions)
}

/// `ProtocolNameList`: a 2-byte outer length followed by `{ opaque<1..2^8-1>; }`
/// entries. Unlike `SupportedVersions`, a length mismatch here is treated as
/// a malformed (and silently ignored) offer rather than a hard failure —
/// nothing downstream depends on ALPN the way TLS 1.3 negotiation depends on
/// `SupportedVersions`.
fn decode_alpn(body: &[u8]) -> Option<ApplicationProtocolSet> {
    let cursor = Cursor::new(body);
    let (list, rest) = cursor.take_opaque2().ok()?;
    if !rest.is_empty() {
        return None;
    }
    let mut set = ApplicationProtocolSet::NONE;
    let mut walker = Cursor::new(list);
    while !walker.is_empty() {
        let (name, next) = walker.take_opaque1().ok()?;
        set.insert(classify_alpn(name));
        walker = next;
    }
    Some(set)
}

/// `cipher_suites` is already guaranteed non-empty and even-length by
/// `ClientHello::parse_msg_data` before this is ever called.
fn decode_cipher_suites(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_versions_round_trip() {
        let body = [0x02, 0x03, 0x04];
        let versions = decode_supported_versions(&body).unwrap();
        assert_eq!(versions, ProtocolVersion::TLS13);
    }

    #[test]
    fn supported_versions_length_mismatch_fails() {
        let body = [0x02, 0x03, 0x04, 0xff];
        assert!(decode_supported_versions(&body).is_none());
    }

    #[test]
    fn alpn_classifies_h2_and_http11() {
        let body: &[u8] = &[
            0x00, 0x0c, // outer length, 12
            0x02, b'h', b'2', // "h2"
            0x08, b'h', b't', b't', b'p', b'/', b'1', b'.', b'1', // "http/1.1"
        ];
        let set = decode_alpn(body).unwrap();
        assert!(set.contains(ApplicationProtocolSet::HTTP2));
        assert!(set.contains(ApplicationProtocolSet::HTTP11));
    }

    #[test]
    fn decode_cipher_suites_reads_pairs() {
        let suites = decode_cipher_suites(&[0x13, 0x01, 0x13, 0x02]);
        assert_eq!(suites, vec![0x1301, 0x1302]);
    }
}
