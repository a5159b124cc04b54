/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

/// Which optional pieces of a frame the caller wants decoded. Every bit is
/// independent: a caller that only cares whether a connection is HTTP/2 can
/// set just [`ProcessingOptions::APPLICATION_PROTOCOL`] and skip the cost of
/// decoding SNI or cipher suites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessingOptions(u32);

impl ProcessingOptions {
    pub const NONE: ProcessingOptions = ProcessingOptions(0);
    pub const SERVER_NAME: ProcessingOptions = ProcessingOptions(1);
    pub const APPLICATION_PROTOCOL: ProcessingOptions = ProcessingOptions(2);
    pub const VERSIONS: ProcessingOptions = ProcessingOptions(4);
    pub const CIPHER_SUITES: ProcessingOptions = ProcessingOptions(8);
    pub const ALL: ProcessingOptions = ProcessingOptions(0x7fff_ffff);

    pub fn contains(&self, other: ProcessingOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ProcessingOptions) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for ProcessingOptions {
    type Output = ProcessingOptions;

    fn bitor(self, rhs: ProcessingOptions) -> ProcessingOptions {
        ProcessingOptions(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ProcessingOptions {
    fn bitor_assign(&mut self, rhs: ProcessingOptions) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_named_bit() {
        assert!(ProcessingOptions::ALL.contains(ProcessingOptions::SERVER_NAME));
        assert!(ProcessingOptions::ALL.contains(ProcessingOptions::APPLICATION_PROTOCOL));
        assert!(ProcessingOptions::ALL.contains(ProcessingOptions::VERSIONS));
        assert!(ProcessingOptions::ALL.contains(ProcessingOptions::CIPHER_SUITES));
    }

    #[test]
    fn none_contains_nothing() {
        assert!(!ProcessingOptions::NONE.contains(ProcessingOptions::SERVER_NAME));
    }

    #[test]
    fn combine_with_bitor() {
        let opts = ProcessingOptions::SERVER_NAME | ProcessingOptions::VERSIONS;
        assert!(opts.contains(ProcessingOptions::SERVER_NAME));
        assert!(opts.contains(ProcessingOptions::VERSIONS));
        assert!(!opts.contains(ProcessingOptions::CIPHER_SUITES));
    }
}
