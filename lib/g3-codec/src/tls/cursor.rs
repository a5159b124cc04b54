/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

//! A read-only byte cursor shared by every decoder in this module.
//!
//! Every operation is total: on success it returns the decoded value
//! together with a cursor over whatever bytes remain, and on failure it
//! returns [`TooShort`] naming how many more bytes are needed. Nothing here
//! indexes out of bounds or panics, by construction — no parser above this
//! layer should reach into a raw slice directly.

/// Signals that a read needs more bytes than the cursor currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooShort(pub usize);

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], TooShort> {
        if self.data.len() < n {
            Err(TooShort(n - self.data.len()))
        } else {
            Ok(&self.data[..n])
        }
    }

    /// Skip `n` bytes. Returns an empty cursor when `n >= remaining`, never
    /// panics.
    #[must_use]
    pub fn skip(self, n: usize) -> Self {
        if n >= self.data.len() {
            Cursor { data: &[] }
        } else {
            Cursor {
                data: &self.data[n..],
            }
        }
    }

    pub fn read_u8(self) -> Result<(u8, Self), TooShort> {
        let b = self.peek(1)?;
        Ok((b[0], self.skip(1)))
    }

    pub fn read_u16_be(self) -> Result<(u16, Self), TooShort> {
        let b = self.peek(2)?;
        Ok((u16::from_be_bytes([b[0], b[1]]), self.skip(2)))
    }

    pub fn read_u24_be(self) -> Result<(u32, Self), TooShort> {
        let b = self.peek(3)?;
        Ok((u32::from_be_bytes([0, b[0], b[1], b[2]]), self.skip(3)))
    }

    /// Read a 1-byte length prefix followed by that many bytes of payload.
    pub fn take_opaque1(self) -> Result<(&'a [u8], Self), TooShort> {
        let (len, rest) = self.read_u8()?;
        let body = rest.peek(len as usize)?;
        Ok((body, rest.skip(len as usize)))
    }

    /// Read a 2-byte length prefix followed by that many bytes of payload.
    pub fn take_opaque2(self) -> Result<(&'a [u8], Self), TooShort> {
        let (len, rest) = self.read_u16_be()?;
        let body = rest.peek(len as usize)?;
        Ok((body, rest.skip(len as usize)))
    }
}
