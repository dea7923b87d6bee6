// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use driftwire::{BinaryProtocolReader, TProtocolReader, TType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&kind, rest)) = data.split_first() else {
        return;
    };
    // Skipping any value kind over arbitrary bytes stays bounded by the depth limit
    if let Some(ttype) = TType::from_u8(kind) {
        let mut reader = BinaryProtocolReader::new(rest);
        let _ = reader.skip(ttype);
    }
});
