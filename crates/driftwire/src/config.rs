// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration - limits and defaults.
//!
//! All protocol limits live here. A [`CodecManager`](crate::CodecManager) owns
//! one [`CodecConfig`] and hands it to every protocol reader/writer it creates.
//!
//! # Example
//!
//! ```
//! use driftwire::config::CodecConfig;
//!
//! let config = CodecConfig::default()
//!     .with_max_depth(16)
//!     .with_max_container_len(10_000);
//! assert_eq!(config.max_depth, 16);
//! ```

/// Maximum nesting depth for structs and skipped values.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum element count accepted in a list, set or map header.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 16 * 1024 * 1024;

/// Maximum byte length accepted for a string or binary value.
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Initial capacity of buffers created by `CodecManager::serialize`.
pub const DEFAULT_WRITE_CAPACITY: usize = 256;

/// Upper bound on up-front allocation for decoded containers.
///
/// Container headers come from untrusted input; vectors grow past this
/// naturally as elements are actually decoded.
pub const PREALLOC_LIMIT: usize = 1024;

/// Runtime codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum struct nesting / skip recursion depth.
    pub max_depth: usize,
    /// Maximum number of elements in one container.
    pub max_container_len: usize,
    /// Maximum length of one string or binary value, in bytes.
    pub max_string_len: usize,
    /// Initial output buffer capacity.
    pub write_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: DEFAULT_MAX_CONTAINER_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            write_capacity: DEFAULT_WRITE_CAPACITY,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_container_len(mut self, max_container_len: usize) -> Self {
        self.max_container_len = max_container_len;
        self
    }

    #[must_use]
    pub const fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    #[must_use]
    pub const fn with_write_capacity(mut self, write_capacity: usize) -> Self {
        self.write_capacity = write_capacity;
        self
    }
}
