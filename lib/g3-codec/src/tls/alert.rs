/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::cursor::Cursor;
use super::version::ProtocolVersion;

/// Alert level, RFC 8446 §6: `enum { warning(1), fatal(2), (255) }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Fatal,
    Unknown(u8),
}

impl AlertLevel {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            1 => AlertLevel::Warning,
            2 => AlertLevel::Fatal,
            other => AlertLevel::Unknown(other),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            AlertLevel::Warning => 1,
            AlertLevel::Fatal => 2,
            AlertLevel::Unknown(v) => *v,
        }
    }
}

/// Alert description, RFC 8446 §6 / the IANA TLS Alert registry. Only the
/// codes this crate has a reason to name get a variant; the rest still
/// round-trip through `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDescription {
    CloseNotify,
    UnexpectedMessage,
    BadRecordMac,
    RecordOverflow,
    HandshakeFailure,
    BadCertificate,
    UnsupportedCertificate,
    CertificateRevoked,
    CertificateExpired,
    CertificateUnknown,
    IllegalParameter,
    UnknownCa,
    AccessDenied,
    DecodeError,
    DecryptError,
    ProtocolVersion,
    InsufficientSecurity,
    InternalError,
    InappropriateFallback,
    UserCanceled,
    MissingExtension,
    UnsupportedExtension,
    UnrecognizedName,
    BadCertificateStatusResponse,
    UnknownPskIdentity,
    CertificateRequired,
    NoApplicationProtocol,
    Unknown(u8),
}

impl AlertDescription {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => AlertDescription::CloseNotify,
            10 => AlertDescription::UnexpectedMessage,
            20 => AlertDescription::BadRecordMac,
            22 => AlertDescription::RecordOverflow,
            40 => AlertDescription::HandshakeFailure,
            42 => AlertDescription::BadCertificate,
            43 => AlertDescription::UnsupportedCertificate,
            44 => AlertDescription::CertificateRevoked,
            45 => AlertDescription::CertificateExpired,
            46 => AlertDescription::CertificateUnknown,
            47 => AlertDescription::IllegalParameter,
            48 => AlertDescription::UnknownCa,
            49 => AlertDescription::AccessDenied,
            50 => AlertDescription::DecodeError,
            51 => AlertDescription::DecryptError,
            70 => AlertDescription::ProtocolVersion,
            71 => AlertDescription::InsufficientSecurity,
            80 => AlertDescription::InternalError,
            86 => AlertDescription::InappropriateFallback,
            90 => AlertDescription::UserCanceled,
            109 => AlertDescription::MissingExtension,
            110 => AlertDescription::UnsupportedExtension,
            112 => AlertDescription::UnrecognizedName,
            113 => AlertDescription::BadCertificateStatusResponse,
            115 => AlertDescription::UnknownPskIdentity,
            116 => AlertDescription::CertificateRequired,
            120 => AlertDescription::NoApplicationProtocol,
            other => AlertDescription::Unknown(other),
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            AlertDescription::CloseNotify => 0,
            AlertDescription::UnexpectedMessage => 10,
            AlertDescription::BadRecordMac => 20,
            AlertDescription::RecordOverflow => 22,
            AlertDescription::HandshakeFailure => 40,
            AlertDescription::BadCertificate => 42,
            AlertDescription::UnsupportedCertificate => 43,
            AlertDescription::CertificateRevoked => 44,
            AlertDescription::CertificateExpired => 45,
            AlertDescription::CertificateUnknown => 46,
            AlertDescription::IllegalParameter => 47,
            AlertDescription::UnknownCa => 48,
            AlertDescription::AccessDenied => 49,
            AlertDescription::DecodeError => 50,
            AlertDescription::DecryptError => 51,
            AlertDescription::ProtocolVersion => 70,
            AlertDescription::InsufficientSecurity => 71,
            AlertDescription::InternalError => 80,
            AlertDescription::InappropriateFallback => 86,
            AlertDescription::UserCanceled => 90,
            AlertDescription::MissingExtension => 109,
            AlertDescription::UnsupportedExtension => 110,
            AlertDescription::UnrecognizedName => 112,
            AlertDescription::BadCertificateStatusResponse => 113,
            AlertDescription::UnknownPskIdentity => 115,
            AlertDescription::CertificateRequired => 116,
            AlertDescription::NoApplicationProtocol => 120,
            AlertDescription::Unknown(v) => *v,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlertParseError {
    #[error("need {0} more bytes to read an alert body")]
    NeedMoreData(usize),
}

/// Decode a 2-byte Alert record body (`level`, `description`), with the
/// outer record header already stripped.
pub fn decode_alert(body: &[u8]) -> Result<(AlertLevel, AlertDescription), AlertParseError> {
    let cursor = Cursor::new(body);
    let (level, cursor) = cursor
        .read_u8()
        .map_err(|too_short| AlertParseError::NeedMoreData(too_short.0))?;
    let (description, _) = cursor
        .read_u8()
        .map_err(|too_short| AlertParseError::NeedMoreData(too_short.0))?;
    Ok((AlertLevel::from_u8(level), AlertDescription::from_u8(description)))
}

/// The five fixed `protocol_version` Alert records this parser's peer is
/// expected to emit when it rejects a proposed version outright.
const PROTOCOL_VERSION_ALERTS: &[(ProtocolVersion, [u8; 7])] = &[
    (ProtocolVersion::TLS13, [0x15, 0x03, 0x04, 0x00, 0x02, 0x02, 0x46]),
    (ProtocolVersion::TLS12, [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x46]),
    (ProtocolVersion::TLS11, [0x15, 0x03, 0x02, 0x00, 0x02, 0x02, 0x46]),
    (ProtocolVersion::TLS10, [0x15, 0x03, 0x01, 0x00, 0x02, 0x02, 0x46]),
    (ProtocolVersion::SSL3, [0x15, 0x03, 0x00, 0x00, 0x02, 0x02, 0x28]),
];

fn minor_byte(version: ProtocolVersion) -> Option<u8> {
    if version == ProtocolVersion::TLS13 {
        Some(4)
    } else if version == ProtocolVersion::TLS12 {
        Some(3)
    } else if version == ProtocolVersion::TLS11 {
        Some(2)
    } else if version == ProtocolVersion::TLS10 {
        Some(1)
    } else {
        None
    }
}

/// Build an outgoing Alert record for `version`. For `reason ==
/// ProtocolVersion` this returns one of the five fixed records above; for
/// any other reason it synthesizes a generic fatal Alert, provided `version`
/// is TLS 1.0 or later. Returns an empty vector when neither applies (SSL 3.0
/// and earlier have no generic synthesis path here).
pub fn create_alert_frame(version: ProtocolVersion, reason: AlertDescription) -> Vec<u8> {
    if reason == AlertDescription::ProtocolVersion {
        for (v, bytes) in PROTOCOL_VERSION_ALERTS {
            if *v == version {
                return bytes.to_vec();
            }
        }
        return Vec::new();
    }
    match minor_byte(version) {
        Some(minor) => vec![21, 3, minor, 0, 2, 2, reason.as_u8()],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fatal_protocol_version() {
        let (level, description) = decode_alert(&[0x02, 0x46]).unwrap();
        assert_eq!(level, AlertLevel::Fatal);
        assert_eq!(description, AlertDescription::ProtocolVersion);
    }

    #[test]
    fn needs_more_data() {
        assert_eq!(decode_alert(&[0x02]).unwrap_err(), AlertParseError::NeedMoreData(1));
    }

    #[test]
    fn builds_tls13_protocol_version_alert() {
        let frame = create_alert_frame(ProtocolVersion::TLS13, AlertDescription::ProtocolVersion);
        assert_eq!(frame, vec![0x15, 0x03, 0x04, 0x00, 0x02, 0x02, 0x46]);
    }

    #[test]
    fn builds_ssl3_protocol_version_alert() {
        let frame = create_alert_frame(ProtocolVersion::SSL3, AlertDescription::ProtocolVersion);
        assert_eq!(frame, vec![0x15, 0x03, 0x00, 0x00, 0x02, 0x02, 0x28]);
    }

    #[test]
    fn builds_generic_alert_for_tls12() {
        let frame = create_alert_frame(ProtocolVersion::TLS12, AlertDescription::HandshakeFailure);
        assert_eq!(frame, vec![21, 3, 3, 0, 2, 2, 40]);
    }

    #[test]
    fn no_generic_alert_below_tls1_0() {
        let frame = create_alert_frame(ProtocolVersion::SSL3, AlertDescription::HandshakeFailure);
        assert!(frame.is_empty());
    }

    #[test]
    fn protocol_version_alert_unmapped_version_is_empty() {
        let frame = create_alert_frame(ProtocolVersion::NONE, AlertDescription::ProtocolVersion);
        assert!(frame.is_empty());
    }

    #[test]
    fn round_trip_every_protocol_version_alert() {
        for (version, _) in PROTOCOL_VERSION_ALERTS {
            let frame = create_alert_frame(*version, AlertDescription::ProtocolVersion);
            let (level, description) = decode_alert(&frame[5..]).unwrap();
            assert_eq!(level, AlertLevel::Fatal);
            assert_eq!(description, AlertDescription::ProtocolVersion);
        }
    }
}
