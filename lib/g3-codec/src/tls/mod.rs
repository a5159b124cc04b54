/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

//! Wire-level decoders for the SSL/TLS record and handshake framing used to
//! sniff a connection's negotiated protocol version, SNI, ALPN offers, and
//! cipher suites without terminating TLS.
//!
//! This module only decodes; it never validates a certificate, negotiates
//! keys, or does anything else that would make it a TLS implementation.

mod cursor;
pub use cursor::{Cursor, TooShort};

mod version;
pub use version::{ProtocolVersion, RawVersion};

mod record;
pub use record::{
    read_record_header, ContentType, Record, RecordHeader, RecordParseError, RECORD_HEADER_LEN,
};

mod handshake;
pub(crate) use handshake::HandshakeHeader;
pub use handshake::{
    ClientHello, ClientHelloParseError, HandshakeCoalesceError, HandshakeCoalescer,
    HandshakeMessage, HandshakeMessageParseError, HandshakeType, ServerHello, ServerHelloParseError,
};

mod extension;
pub use extension::{ExtensionIter, ExtensionList, ExtensionParseError, ExtensionType};

mod alert;
pub use alert::{create_alert_frame, decode_alert, AlertDescription, AlertLevel, AlertParseError};
