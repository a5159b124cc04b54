/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

mod server_name;
pub use server_name::{TlsServerName, TlsServerNameParseError};
