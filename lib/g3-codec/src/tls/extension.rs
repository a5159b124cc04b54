/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::cursor::Cursor;

/// Extension type tag, per the IANA TLS ExtensionType registry. Only the
/// handful this crate decodes get a named variant; everything else passes
/// through as `Unknown` so a caller can still recognize and skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    ServerName,
    ApplicationLayerProtocolNegotiation,
    SupportedVersions,
    Unknown(u16),
}

impl ExtensionType {
    pub const fn from_u16(v: u16) -> Self {
        match v {
            0x0000 => ExtensionType::ServerName,
            0x0010 => ExtensionType::ApplicationLayerProtocolNegotiation,
            0x002b => ExtensionType::SupportedVersions,
            other => ExtensionType::Unknown(other),
        }
    }

    pub const fn as_u16(&self) -> u16 {
        match self {
            ExtensionType::ServerName => 0x0000,
            ExtensionType::ApplicationLayerProtocolNegotiation => 0x0010,
            ExtensionType::SupportedVersions => 0x002b,
            ExtensionType::Unknown(v) => *v,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionParseError {
    #[error("truncated extension header")]
    TruncatedHeader,
    #[error("extension declares a length that runs past the extension list")]
    TruncatedBody,
}

/// Walks a `{ ExtensionType type; opaque data<0..2^16-1>; } extension[]` list
/// one entry at a time.
///
/// Once an entry's declared length doesn't fit in what's left of the list,
/// the iterator yields a single `Err` and then ends: it never tries to
/// resynchronize on a corrupt list. A caller that wants to salvage whatever
/// extensions parsed before the bad one should stop consuming at the first
/// `Err` rather than propagate it.
pub struct ExtensionIter<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> ExtensionIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ExtensionIter { data, done: false }
    }
}

impl<'a> Iterator for ExtensionIter<'a> {
    type Item = Result<(ExtensionType, &'a [u8]), ExtensionParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.data.is_empty() {
            self.done = true;
            return None;
        }

        let cursor = Cursor::new(self.data);
        let (raw_type, cursor) = match cursor.read_u16_be() {
            Ok(v) => v,
            Err(_) => {
                self.done = true;
                return Some(Err(ExtensionParseError::TruncatedHeader));
            }
        };
        let (ext_len, cursor) = match cursor.read_u16_be() {
            Ok(v) => v,
            Err(_) => {
                self.done = true;
                return Some(Err(ExtensionParseError::TruncatedHeader));
            }
        };
        let value = match cursor.peek(ext_len as usize) {
            Ok(v) => v,
            Err(_) => {
                self.done = true;
                return Some(Err(ExtensionParseError::TruncatedBody));
            }
        };
        self.data = cursor.skip(ext_len as usize).as_slice();
        Some(Ok((ExtensionType::from_u16(raw_type), value)))
    }
}

/// Stateless helpers over a raw extension list, for callers that just want
/// one extension rather than a full walk.
pub struct ExtensionList;

impl ExtensionList {
    /// Find the first extension matching `ext_type`. Returns `Ok(None)` if
    /// the list parses cleanly but doesn't contain it, and propagates the
    /// first parse error encountered while scanning (even one past the
    /// match point would already have surfaced on the way there).
    pub fn get_ext(
        data: &[u8],
        ext_type: ExtensionType,
    ) -> Result<Option<&[u8]>, ExtensionParseError> {
        for entry in ExtensionIter::new(data) {
            let (t, value) = entry?;
            if t == ext_type {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
