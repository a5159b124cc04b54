/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use g3_codec::tls::{AlertDescription, AlertLevel, HandshakeType, ProtocolVersion, RecordHeader};
use g3_types::net::TlsServerName;

use super::application_protocol::ApplicationProtocolSet;

/// How cleanly a frame parsed. Severity only ever escalates within a single
/// [`super::try_get_frame_info`] call: once a deeper layer has marked a frame
/// `InvalidFrame` or `UnsupportedFrame`, nothing later in the same call is
/// allowed to report a milder status over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsingStatus {
    #[default]
    Ok,
    IncompleteFrame,
    UnsupportedFrame,
    InvalidFrame,
}

impl ParsingStatus {
    fn rank(self) -> u8 {
        match self {
            ParsingStatus::Ok => 0,
            ParsingStatus::IncompleteFrame => 1,
            ParsingStatus::UnsupportedFrame => 2,
            ParsingStatus::InvalidFrame => 3,
        }
    }

    /// Raise this status to `candidate` if `candidate` is more severe;
    /// otherwise leave it alone.
    pub fn escalate(&mut self, candidate: ParsingStatus) {
        if candidate.rank() > self.rank() {
            *self = candidate;
        }
    }
}

/// Everything `try_get_frame_info` could extract from one record, gated by
/// whichever [`super::ProcessingOptions`] bits the caller asked for.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub header: RecordHeader,
    pub handshake_type: Option<HandshakeType>,
    pub supported_versions: ProtocolVersion,
    pub target_name: Option<TlsServerName>,
    pub application_protocols: ApplicationProtocolSet,
    pub cipher_suites: Vec<u16>,
    pub alert_level: Option<AlertLevel>,
    pub alert_description: Option<AlertDescription>,
    pub status: ParsingStatus,
}

impl FrameInfo {
    /// A blank result with an unrecognized header, used as the starting
    /// point before a frame has been looked at at all.
    pub fn empty() -> Self {
        FrameInfo {
            header: RecordHeader::unknown(),
            handshake_type: None,
            supported_versions: ProtocolVersion::NONE,
            target_name: None,
            application_protocols: ApplicationProtocolSet::NONE,
            cipher_suites: Vec::new(),
            alert_level: None,
            alert_description: None,
            status: ParsingStatus::Ok,
        }
    }
}
