/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

mod client_hello;
pub use client_hello::{ClientHello, ClientHelloParseError};

mod server_hello;
pub use server_hello::{ServerHello, ServerHelloParseError};

/// A generous upper bound on a coalesced handshake message. A sniffed hello
/// is never anywhere close to this; it exists only to keep an adversarial
/// declared length from making the coalescer buffer forever.
const MAX_MESSAGE_LEN: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    HelloVerifyRequest,
    NewSessionTicket,
    EndOfEarlyData,
    EncryptedExtensions,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
    CertificateUrl,
    CertificateStatus,
    SupplementalData,
    KeyUpdate,
    MessageHash,
    Unknown(u8),
}

impl HandshakeType {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => HandshakeType::HelloRequest,
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            3 => HandshakeType::HelloVerifyRequest,
            4 => HandshakeType::NewSessionTicket,
            5 => HandshakeType::EndOfEarlyData,
            8 => HandshakeType::EncryptedExtensions,
            11 => HandshakeType::Certificate,
            12 => HandshakeType::ServerKeyExchange,
            13 => HandshakeType::CertificateRequest,
            14 => HandshakeType::ServerHelloDone,
            15 => HandshakeType::CertificateVerify,
            16 => HandshakeType::ClientKeyExchange,
            20 => HandshakeType::Finished,
            21 => HandshakeType::CertificateUrl,
            22 => HandshakeType::CertificateStatus,
            23 => HandshakeType::SupplementalData,
            24 => HandshakeType::KeyUpdate,
            254 => HandshakeType::MessageHash,
            other => HandshakeType::Unknown(other),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            HandshakeType::HelloRequest => 0,
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::HelloVerifyRequest => 3,
            HandshakeType::NewSessionTicket => 4,
            HandshakeType::EndOfEarlyData => 5,
            HandshakeType::EncryptedExtensions => 8,
            HandshakeType::Certificate => 11,
            HandshakeType::ServerKeyExchange => 12,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::ServerHelloDone => 14,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::ClientKeyExchange => 16,
            HandshakeType::Finished => 20,
            HandshakeType::CertificateUrl => 21,
            HandshakeType::CertificateStatus => 22,
            HandshakeType::SupplementalData => 23,
            HandshakeType::KeyUpdate => 24,
            HandshakeType::MessageHash => 254,
            HandshakeType::Unknown(v) => *v,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HandshakeHeader {
    pub msg_type: u8,
    pub msg_length: u32,
}

impl HandshakeHeader {
    pub(crate) const SIZE: usize = 4;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeMessageParseError {
    #[error("need {0} more bytes to read a handshake message")]
    NeedMoreData(usize),
    #[error("declared handshake message length {0} is implausible")]
    TooLarge(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeCoalesceError {
    #[error("record is not a handshake record")]
    NotHandshake,
    #[error(transparent)]
    Message(#[from] HandshakeMessageParseError),
}

/// An owned, fully-assembled handshake message: `{ u8 msg_type; u24
/// length; body }`. Owned (rather than borrowed) because a message may have
/// been coalesced from more than one TLS record.
pub struct HandshakeMessage {
    data: Vec<u8>,
}

impl HandshakeMessage {
    /// Parse a handshake message directly from a buffer that already holds
    /// (at least) the whole message, with no coalescing involved.
    pub fn try_parse_fragment(data: &[u8]) -> Result<Self, HandshakeMessageParseError> {
        if data.len() < HandshakeHeader::SIZE {
            return Err(HandshakeMessageParseError::NeedMoreData(
                HandshakeHeader::SIZE - data.len(),
            ));
        }
        let msg_length = u32::from_be_bytes([0, data[1], data[2], data[3]]) as usize;
        if msg_length > MAX_MESSAGE_LEN {
            return Err(HandshakeMessageParseError::TooLarge(msg_length));
        }
        let total = HandshakeHeader::SIZE + msg_length;
        if data.len() < total {
            return Err(HandshakeMessageParseError::NeedMoreData(total - data.len()));
        }
        Ok(HandshakeMessage {
            data: data[..total].to_vec(),
        })
    }

    pub(crate) fn header(&self) -> HandshakeHeader {
        HandshakeHeader {
            msg_type: self.data[0],
            msg_length: u32::from_be_bytes([0, self.data[1], self.data[2], self.data[3]]),
        }
    }

    pub fn msg_type(&self) -> HandshakeType {
        HandshakeType::from_u8(self.data[0])
    }

    /// Length of the handshake message body, not counting the 4-byte
    /// message header.
    pub fn body_len(&self) -> usize {
        self.data.len() - HandshakeHeader::SIZE
    }

    pub fn parse_client_hello(&self) -> Result<ClientHello<'_>, ClientHelloParseError> {
        ClientHello::parse_fragment(self.header(), &self.data)
    }

    pub fn parse_server_hello(&self) -> Result<ServerHello<'_>, ServerHelloParseError> {
        ServerHello::parse_fragment(self.header(), &self.data)
    }
}

/// Assembles a handshake message out of one or more TLS records' worth of
/// handshake-content-type body bytes. Scoped to a single `try_get_frame_info`
/// call: create a fresh coalescer per call, never persist one across calls.
#[derive(Default)]
pub struct HandshakeCoalescer {
    buf: Vec<u8>,
}

impl HandshakeCoalescer {
    pub(crate) fn push(
        &mut self,
        data: &[u8],
    ) -> Result<(Option<HandshakeMessage>, usize), HandshakeCoalesceError> {
        let used = data.len();
        self.buf.extend_from_slice(data);

        if self.buf.len() < HandshakeHeader::SIZE {
            return Ok((None, used));
        }
        let msg_length = u32::from_be_bytes([0, self.buf[1], self.buf[2], self.buf[3]]) as usize;
        if msg_length > MAX_MESSAGE_LEN {
            return Err(HandshakeMessageParseError::TooLarge(msg_length).into());
        }
        let total = HandshakeHeader::SIZE + msg_length;
        if self.buf.len() < total {
            return Ok((None, used));
        }

        let mut owned = std::mem::take(&mut self.buf);
        self.buf = owned.split_off(total);
        Ok((Some(HandshakeMessage { data: owned }), used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_across_two_pushes() {
        let mut coalescer = HandshakeCoalescer::default();
        let (msg, used) = coalescer.push(&[0x01, 0x00, 0x00]).unwrap();
        assert!(msg.is_none());
        assert_eq!(used, 3);

        let (msg, used) = coalescer
            .push(&[0x02, b'h', b'i'])
            .unwrap();
        let msg = msg.unwrap();
        assert_eq!(used, 3);
        assert_eq!(msg.msg_type(), HandshakeType::ClientHello);
        assert_eq!(msg.body_len(), 2);
    }

    #[test]
    fn rejects_implausible_length() {
        let mut coalescer = HandshakeCoalescer::default();
        let err = coalescer
            .push(&[0x01, 0xff, 0xff, 0xff])
            .unwrap_err();
        assert!(matches!(
            err,
            HandshakeCoalesceError::Message(HandshakeMessageParseError::TooLarge(_))
        ));
    }
}
