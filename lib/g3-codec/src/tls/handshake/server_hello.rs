/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{HandshakeHeader, HandshakeType};
use crate::tls::extension::ExtensionIter;
use crate::tls::{ExtensionList, ExtensionParseError, ExtensionType, RawVersion};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerHelloParseError {
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("invalid message length")]
    InvalidMessageLength,
    #[error("unsupported legacy version {0:?}")]
    UnsupportedVersion(RawVersion),
}

/// A parsed ServerHello body.
///
/// Unlike [`ClientHello`](super::ClientHello), a ServerHello with no
/// extensions block is treated as malformed rather than as "no extensions
/// present": every ServerHello this parser is meant to see negotiates at
/// least one extension (if nothing else, `SupportedVersions` in a TLS 1.3
/// handshake), so an absent extensions block more likely indicates the
/// frame was misidentified than that the peer genuinely sent none.
pub struct ServerHello<'a> {
    pub legacy_version: RawVersion,
    pub cipher_suite: [u8; 2],
    pub compression_method: u8,
    pub extensions: &'a [u8],
}

impl<'a> ServerHello<'a> {
    pub fn parse_fragment(
        handshake_header: HandshakeHeader,
        data: &'a [u8],
    ) -> Result<Self, ServerHelloParseError> {
        if handshake_header.msg_type != HandshakeType::ServerHello.as_u8() {
            return Err(ServerHelloParseError::InvalidMessageType(
                handshake_header.msg_type,
            ));
        }
        let expected_data_len = handshake_header.msg_length as usize + HandshakeHeader::SIZE;
        if expected_data_len > data.len() {
            return Err(ServerHelloParseError::InvalidMessageLength);
        }

        Self::parse_msg_data(&data[HandshakeHeader::SIZE..])
    }

    pub(crate) fn parse_msg_data(data: &'a [u8]) -> Result<Self, ServerHelloParseError> {
        const RANDOM_FIELD_SIZE: usize = 32;

        macro_rules! ensure_min {
            ($buf:expr, $min:expr) => {
                if $buf.len() < $min {
                    return Err(ServerHelloParseError::InvalidMessageLength);
                }
            };
        }

        ensure_min!(data, 2);
        let legacy_version = RawVersion::new(data[0], data[1]);
        match (data[0], data[1]) {
            (1, 1) => {} // TLCP 1.1
            (3, 0) => {} // SSL 3.0
            (3, 1) => {} // TLS 1.0
            (3, 2) => {} // TLS 1.1
            (3, 3) => {} // TLS 1.2 and TLS 1.3 (negotiated via SupportedVersions)
            _ => return Err(ServerHelloParseError::UnsupportedVersion(legacy_version)),
        }
        let mut offset = 2;

        // Random
        let left = &data[offset..];
        ensure_min!(left, RANDOM_FIELD_SIZE);
        offset += RANDOM_FIELD_SIZE;

        // Session ID
        let left = &data[offset..];
        if left.is_empty() {
            return Err(ServerHelloParseError::InvalidMessageLength);
        }
        let session_id_len = left[0] as usize;
        ensure_min!(left, 1 + session_id_len);
        offset += 1 + session_id_len;

        // Cipher Suite
        let left = &data[offset..];
        ensure_min!(left, 2);
        let cipher_suite = [left[0], left[1]];
        offset += 2;

        // Compression Method
        let left = &data[offset..];
        ensure_min!(left, 1);
        let compression_method = left[0];
        offset += 1;

        // Extensions: required here, unlike ClientHello.
        let left = &data[offset..];
        ensure_min!(left, 2);
        let extensions_len = u16::from_be_bytes([left[0], left[1]]) as usize;
        ensure_min!(left, 2 + extensions_len);
        let start = offset + 2;
        let end = start + extensions_len;
        offset = end;
        if data.len() != offset {
            return Err(ServerHelloParseError::InvalidMessageLength);
        }

        Ok(ServerHello {
            legacy_version,
            cipher_suite,
            compression_method,
            extensions: &data[start..end],
        })
    }

    pub fn get_ext(&self, ext_type: ExtensionType) -> Result<Option<&[u8]>, ExtensionParseError> {
        ExtensionList::get_ext(self.extensions, ext_type)
    }

    pub fn ext_iter(&self) -> ExtensionIter<'_> {
        ExtensionIter::new(self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::HandshakeMessage;

    fn fixture(extensions: &[u8]) -> Vec<u8> {
        let mut body = vec![0x03, 0x03]; // TLS 1.2
        body.extend_from_slice(&[0u8; 32]); // random
        body.push(0); // no session id
        body.extend_from_slice(&[0x13, 0x01]); // cipher suite
        body.push(0); // compression method
        body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
        body.extend_from_slice(extensions);

        let mut msg = vec![0x02]; // ServerHello
        msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        msg.extend_from_slice(&body);
        msg
    }

    #[test]
    fn parses_supported_versions_extension() {
        let extensions: &[u8] = &[0x00, 0x2b, 0x00, 0x02, 0x03, 0x04];
        let data = fixture(extensions);
        let msg = HandshakeMessage::try_parse_fragment(&data).unwrap();
        let sh = msg.parse_server_hello().unwrap();
        let value = sh.get_ext(ExtensionType::SupportedVersions).unwrap().unwrap();
        assert_eq!(value, &[0x03, 0x04]);
    }

    #[test]
    fn missing_extensions_block_is_a_hard_error() {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0u8; 32]);
        body.push(0);
        body.extend_from_slice(&[0x13, 0x01]);
        body.push(0);
        // no extensions length field at all

        let mut msg = vec![0x02];
        msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        msg.extend_from_slice(&body);

        let handshake_msg = HandshakeMessage::try_parse_fragment(&msg).unwrap();
        assert!(handshake_msg.parse_server_hello().is_err());
    }

    #[test]
    fn wrong_message_type_is_rejected() {
        let extensions: &[u8] = &[];
        let mut data = fixture(extensions);
        data[0] = 0x01; // ClientHello tag on a ServerHello body
        let msg = HandshakeMessage::try_parse_fragment(&data).unwrap();
        assert!(matches!(
            msg.parse_server_hello(),
            Err(ServerHelloParseError::InvalidMessageType(1))
        ));
    }
}
