/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{HandshakeHeader, HandshakeType};
use crate::tls::extension::ExtensionIter;
use crate::tls::{ExtensionList, ExtensionParseError, ExtensionType, RawVersion};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientHelloParseError {
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("invalid message length")]
    InvalidMessageLength,
    #[error("invalid cipher suites length")]
    InvalidCipherSuitesLength,
    #[error("unsupported legacy version {0:?}")]
    UnsupportedVersion(RawVersion),
}

pub struct ClientHello<'a> {
    pub legacy_version: RawVersion,
    pub cipher_suites: &'a [u8],
    pub compression_methods: Option<&'a [u8]>,
    pub extensions: Option<&'a [u8]>,
}

impl<'a> ClientHello<'a> {
    /// Parse a ClientHello out of a complete handshake message (header
    /// included).
    pub fn parse_fragment(
        handshake_header: HandshakeHeader,
        data: &'a [u8],
    ) -> Result<Self, ClientHelloParseError> {
        if handshake_header.msg_type != HandshakeType::ClientHello.as_u8() {
            return Err(ClientHelloParseError::InvalidMessageType(
                handshake_header.msg_type,
            ));
        }
        let expected_data_len = handshake_header.msg_length as usize + HandshakeHeader::SIZE;
        if expected_data_len > data.len() {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }

        Self::parse_msg_data(&data[HandshakeHeader::SIZE..])
    }

    /// Parse a ClientHello body, with the 4-byte handshake message header
    /// already stripped off.
    pub(crate) fn parse_msg_data(data: &'a [u8]) -> Result<Self, ClientHelloParseError> {
        const RANDOM_FIELD_SIZE: usize = 32;

        macro_rules! ensure_min {
            ($buf:expr, $min:expr) => {
                if $buf.len() < $min {
                    return Err(ClientHelloParseError::InvalidMessageLength);
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
            _ => return Err(ClientHelloParseError::UnsupportedVersion(legacy_version)),
        }
        let mut offset = 2;

        // Random
        let left = &data[offset..];
        ensure_min!(left, RANDOM_FIELD_SIZE);
        offset += RANDOM_FIELD_SIZE;

        // Session ID
        let left = &data[offset..];
        if left.is_empty() {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let session_id_len = left[0] as usize;
        ensure_min!(left, 1 + session_id_len);
        offset += 1 + session_id_len;

        // Cipher Suites
        let left = &data[offset..];
        ensure_min!(left, 2);
        let cipher_suites_len = u16::from_be_bytes([left[0], left[1]]) as usize;
        if cipher_suites_len == 0 || cipher_suites_len & 0x01 != 0 {
            return Err(ClientHelloParseError::InvalidCipherSuitesLength);
        }
        ensure_min!(left, 2 + cipher_suites_len);
        let start = offset + 2;
        let end = start + cipher_suites_len;
        let cipher_suites = &data[start..end];
        offset = end;

        // Compression Methods
        let left = &data[offset..];
        if left.is_empty() {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }
        let compression_methods_len = left[0] as usize;
        let compression_methods = if compression_methods_len > 0 {
            ensure_min!(left, 1 + compression_methods_len);
            let start = offset + 1;
            let end = start + compression_methods_len;
            offset = end;
            Some(&data[start..end])
        } else {
            offset += 1;
            None
        };

        if data.len() <= offset {
            return Ok(ClientHello {
                legacy_version,
                cipher_suites,
                compression_methods,
                extensions: None,
            });
        }

        // Extensions
        let left = &data[offset..];
        ensure_min!(left, 2);
        let extensions_len = u16::from_be_bytes([left[0], left[1]]) as usize;
        let extensions = if extensions_len > 0 {
            ensure_min!(left, 2 + extensions_len);
            let start = offset + 2;
            let end = start + extensions_len;
            offset = end;
            Some(&data[start..end])
        } else {
            offset += 2;
            None
        };
        if data.len() > offset {
            return Err(ClientHelloParseError::InvalidMessageLength);
        }

        Ok(ClientHello {
            legacy_version,
            cipher_suites,
            compression_methods,
            extensions,
        })
    }

    pub fn get_ext(&self, ext_type: ExtensionType) -> Result<Option<&[u8]>, ExtensionParseError> {
        let Some(data) = self.extensions else {
            return Ok(None);
        };

        ExtensionList::get_ext(data, ext_type)
    }

    pub fn ext_iter(&self) -> ExtensionIter<'_> {
        match self.extensions {
            Some(data) => ExtensionIter::new(data),
            None => ExtensionIter::new(b""),
        }
    }
}
