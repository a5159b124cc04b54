/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

/// A Server Name Indication host name, decoded from the `server_name`
/// extension value of a ClientHello.
///
/// Construction always goes through [`TlsServerName::from_extension_value`],
/// which performs the strict UTF-8 decode and the IDN-to-Unicode step
/// described by the SNI extension format (RFC 6066 §3). The stored string is
/// therefore either a fully IDN-decoded Unicode host name, or (when IDN
/// rejects an otherwise-valid UTF-8 string) the raw UTF-8 host name
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsServerName(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TlsServerNameParseError {
    /// The `ServerNameList` or its first entry is shorter than its own
    /// declared length fields. This is a structural failure: the caller
    /// should fail the whole frame, not just drop the SNI.
    #[error("truncated server name extension")]
    Truncated,
    /// The first (and, per this parser, only consulted) entry in the list
    /// is not a `host_name` (type 0) entry.
    #[error("unsupported server name type {0}")]
    UnsupportedNameType(u8),
    /// The host name bytes are not valid UTF-8. This is *not* a structural
    /// failure: callers should treat it as "no SNI present" and continue
    /// parsing the rest of the frame.
    #[error("server name is not valid utf-8")]
    NotUtf8,
}

impl TlsServerName {
    /// Parse the raw value of a `server_name` extension.
    ///
    /// Only the first entry of the `ServerNameList` is consulted, matching
    /// the behavior of every TLS stack in practice (a second entry would be
    /// meaningless — there is exactly one connection to route).
    pub fn from_extension_value(data: &[u8]) -> Result<Self, TlsServerNameParseError> {
        if data.len() < 2 {
            return Err(TlsServerNameParseError::Truncated);
        }
        let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
        if data.len() < 2 + list_len || list_len < 3 {
            return Err(TlsServerNameParseError::Truncated);
        }
        let list_body = &data[2..2 + list_len];

        let name_type = list_body[0];
        if name_type != 0 {
            return Err(TlsServerNameParseError::UnsupportedNameType(name_type));
        }

        let host_len = u16::from_be_bytes([list_body[1], list_body[2]]) as usize;
        if list_body.len() < 3 + host_len {
            return Err(TlsServerNameParseError::Truncated);
        }
        let host_bytes = &list_body[3..3 + host_len];

        let host_str =
            std::str::from_utf8(host_bytes).map_err(|_| TlsServerNameParseError::NotUtf8)?;

        let decoded = idn_to_unicode(host_str).unwrap_or_else(|| host_str.to_string());
        Ok(TlsServerName(decoded))
    }
}

impl AsRef<str> for TlsServerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TlsServerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best-effort IDN-to-Unicode decode. Returns `None` when `idna` rejects the
/// input, letting the caller fall back to the raw string, matching the
/// documented fallback behavior of the source this parser is modeled on:
/// a host that was never IDN-encoded should still show up as a name rather
/// than being dropped.
fn idn_to_unicode(name: &str) -> Option<String> {
    let config = idna::Config::default()
        .use_std3_ascii_rules(false)
        .transitional_processing(false);
    match config.to_unicode(name) {
        (decoded, Ok(())) => Some(decoded),
        (_, Err(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sni_extension(host: &str) -> Vec<u8> {
        let mut v = Vec::new();
        let entry_len = 3 + host.len();
        v.extend_from_slice(&(entry_len as u16).to_be_bytes());
        v.push(0); // host_name
        v.extend_from_slice(&(host.len() as u16).to_be_bytes());
        v.extend_from_slice(host.as_bytes());
        v
    }

    #[test]
    fn ascii_host_round_trips() {
        let data = sni_extension("example.com");
        let name = TlsServerName::from_extension_value(&data).unwrap();
        assert_eq!(name.as_ref(), "example.com");
    }

    #[test]
    fn punycode_host_decodes_to_unicode() {
        // xn--fsq.com is the A-label for "中.com"
        let data = sni_extension("xn--fsq.com");
        let name = TlsServerName::from_extension_value(&data).unwrap();
        assert_eq!(name.as_ref(), "中.com");
    }

    #[test]
    fn non_host_name_type_is_rejected() {
        let mut data = Vec::new();
        let host = "example.com";
        let entry_len = 3 + host.len();
        data.extend_from_slice(&(entry_len as u16).to_be_bytes());
        data.push(1); // not host_name
        data.extend_from_slice(&(host.len() as u16).to_be_bytes());
        data.extend_from_slice(host.as_bytes());
        assert_eq!(
            TlsServerName::from_extension_value(&data).unwrap_err(),
            TlsServerNameParseError::UnsupportedNameType(1)
        );
    }

    #[test]
    fn truncated_list_is_rejected() {
        let data = [0x00, 0x05, 0x00, 0x00, 0x02];
        assert_eq!(
            TlsServerName::from_extension_value(&data).unwrap_err(),
            TlsServerNameParseError::Truncated
        );
    }

    #[test]
    fn non_utf8_host_is_reported_distinctly() {
        let mut data = Vec::new();
        let host: &[u8] = &[0xff, 0xfe];
        let entry_len = 3 + host.len();
        data.extend_from_slice(&(entry_len as u16).to_be_bytes());
        data.push(0);
        data.extend_from_slice(&(host.len() as u16).to_be_bytes());
        data.extend_from_slice(host);
        assert_eq!(
            TlsServerName::from_extension_value(&data).unwrap_err(),
            TlsServerNameParseError::NotUtf8
        );
    }
}
