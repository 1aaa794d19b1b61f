//! LZW dictionary (code table) management.
//!
//! Every entry is a prefix code plus one suffix byte, so the encoder looks
//! strings up by `(prefix, byte)` and the decoder expands a code by walking
//! its prefix chain.

use crate::config::{LzwConfig, MAX_CODES};
use std::collections::HashMap;

/// Marks a root (single literal) entry.
const NO_PREFIX: u16 = u16::MAX;

/// Encoder-side dictionary: `(prefix code, next byte) -> code`.
#[derive(Debug)]
pub struct EncodeTable {
    map: HashMap<(u16, u8), u16>,
    next_code: u16,
    config: LzwConfig,
}

impl EncodeTable {
    /// Create an empty table for `config`.
    pub fn new(config: LzwConfig) -> Self {
        Self {
            map: HashMap::with_capacity(MAX_CODES as usize),
            next_code: config.first_code(),
            config,
        }
    }

    /// Drop every multi-byte entry.
    pub fn reset(&mut self) {
        self.map.clear();
        self.next_code = self.config.first_code();
        tracing::trace!(min_code_size = self.config.min_code_size, "encoder table reset");
    }

    /// Code of the string `prefix` followed by `byte`.
    #[inline]
    pub fn find(&self, prefix: u16, byte: u8) -> Option<u16> {
        self.map.get(&(prefix, byte)).copied()
    }

    /// Add `prefix` + `byte` as the next code.
    #[inline]
    pub fn insert(&mut self, prefix: u16, byte: u8) {
        self.map.insert((prefix, byte), self.next_code);
        self.next_code += 1;
    }

    /// Next code that would be assigned.
    pub fn next_code(&self) -> u16 {
        self.next_code
    }

    /// Whether all 4096 codes are in use.
    pub fn is_full(&self) -> bool {
        self.next_code >= MAX_CODES
    }
}

/// Decoder-side dictionary stored as parallel prefix/suffix arrays.
#[derive(Debug)]
pub struct DecodeTable {
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    /// First byte of each entry's string, for the KwKwK case.
    first: Vec<u8>,
    next_code: u16,
    config: LzwConfig,
    scratch: Vec<u8>,
}

impl DecodeTable {
    /// Create a table holding only the literal codes.
    pub fn new(config: LzwConfig) -> Self {
        let prefix = vec![NO_PREFIX; MAX_CODES as usize];
        let mut suffix = vec![0u8; MAX_CODES as usize];
        let mut first = vec![0u8; MAX_CODES as usize];
        for code in 0..config.clear_code() {
            suffix[code as usize] = code as u8;
            first[code as usize] = code as u8;
        }
        Self {
            prefix,
            suffix,
            first,
            next_code: config.first_code(),
            config,
            scratch: Vec::with_capacity(MAX_CODES as usize),
        }
    }

    /// Drop every multi-byte entry.
    pub fn reset(&mut self) {
        self.next_code = self.config.first_code();
        tracing::trace!(min_code_size = self.config.min_code_size, "decoder table reset");
    }

    /// Next code that would be assigned.
    pub fn next_code(&self) -> u16 {
        self.next_code
    }

    /// Whether all 4096 codes are in use.
    pub fn is_full(&self) -> bool {
        self.next_code >= MAX_CODES
    }

    /// Whether `code` currently expands to a string.
    pub fn contains(&self, code: u16) -> bool {
        code < self.config.clear_code() || (code >= self.config.first_code() && code < self.next_code)
    }

    /// First byte of the string for a known `code`.
    pub fn first_byte(&self, code: u16) -> u8 {
        self.first[code as usize]
    }

    /// Add `prefix` + `byte` as the next code; ignored once the table is full.
    pub fn insert(&mut self, prefix: u16, byte: u8) {
        if self.is_full() {
            return;
        }
        let code = self.next_code as usize;
        self.prefix[code] = prefix;
        self.suffix[code] = byte;
        self.first[code] = self.first[prefix as usize];
        self.next_code += 1;
    }

    /// Append the string for a known `code` to `out`.
    pub fn expand_into(&mut self, code: u16, out: &mut Vec<u8>) {
        self.scratch.clear();
        let mut current = code;
        loop {
            self.scratch.push(self.suffix[current as usize]);
            let prefix = self.prefix[current as usize];
            if prefix == NO_PREFIX {
                break;
            }
            current = prefix;
        }
        out.extend(self.scratch.iter().rev());
    }
}
