/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

/// The two version bytes exactly as they appear on the wire, before any
/// interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawVersion {
    pub major: u8,
    pub minor: u8,
}

impl RawVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        RawVersion { major, minor }
    }

    /// TLCP (the GB/T 38636 national-standard variant) reuses `major == 1`
    /// at the handshake-body level.
    pub fn is_tlcp(&self) -> bool {
        (self.major == 1) && (self.minor == 1)
    }
}

/// Protocol version tag. Also usable as a bitset: OR instances together to
/// accumulate every version observed while walking a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolVersion(u16);

impl ProtocolVersion {
    pub const NONE: ProtocolVersion = ProtocolVersion(0);
    pub const SSL2: ProtocolVersion = ProtocolVersion(1 << 0);
    pub const SSL3: ProtocolVersion = ProtocolVersion(1 << 1);
    pub const TLS10: ProtocolVersion = ProtocolVersion(1 << 2);
    pub const TLS11: ProtocolVersion = ProtocolVersion(1 << 3);
    pub const TLS12: ProtocolVersion = ProtocolVersion(1 << 4);
    pub const TLS13: ProtocolVersion = ProtocolVersion(1 << 5);

    const TLS_FAMILY: u16 =
        Self::TLS10.0 | Self::TLS11.0 | Self::TLS12.0 | Self::TLS13.0;

    /// Map a `major.minor` pair to its tag. Only the SSL3/TLS family
    /// (`major == 3`) is representable this way; SSL 2.0 and TLCP are
    /// recognized earlier in the pipeline (record header / hello body) and
    /// fed in through [`ProtocolVersion::SSL2`] directly.
    pub fn from_raw(raw: RawVersion) -> Self {
        if raw.major != 3 {
            return ProtocolVersion::NONE;
        }
        match raw.minor {
            4 => ProtocolVersion::TLS13,
            3 => ProtocolVersion::TLS12,
            2 => ProtocolVersion::TLS11,
            1 => ProtocolVersion::TLS10,
            0 => ProtocolVersion::SSL3,
            _ => ProtocolVersion::NONE,
        }
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: ProtocolVersion) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ProtocolVersion) {
        self.0 |= other.0;
    }

    /// True if this tag is TLS 1.0 or any later TLS version (never true for
    /// `NONE`, `SSL2`, or `SSL3`).
    pub fn is_tls1_0_or_later(&self) -> bool {
        self.0 & Self::TLS_FAMILY != 0
    }
}

impl std::ops::BitOr for ProtocolVersion {
    type Output = ProtocolVersion;

    fn bitor(self, rhs: ProtocolVersion) -> ProtocolVersion {
        ProtocolVersion(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ProtocolVersion {
    fn bitor_assign(&mut self, rhs: ProtocolVersion) {
        self.0 |= rhs.0;
    }
}
