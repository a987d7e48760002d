//! Alphabet definition and input filtering
//!
//! The alphabet fixes both the set of characters that survive input
//! normalization and the branching order of the mismatch tree, so symbol
//! order is significant and is frozen at construction.

use std::collections::HashMap;

use crate::core::{KernelError, Result};

/// Ordered, duplicate-free set of symbols
#[derive(Clone, Debug)]
pub struct Alphabet {
    symbols: Vec<char>,
    ordinals: HashMap<char, u8>,
}

impl Alphabet {
    /// Create an alphabet from an ordered sequence of symbols
    ///
    /// Fails if the sequence is empty, contains duplicates, or holds more
    /// than 255 symbols (ordinals are stored as `u8`).
    pub fn new<I>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(KernelError::InvalidParameter(
                "alphabet must not be empty".to_string(),
            ));
        }
        if symbols.len() > u8::MAX as usize {
            return Err(KernelError::InvalidParameter(format!(
                "alphabet holds {} symbols, at most 255 are supported",
                symbols.len()
            )));
        }

        let mut ordinals = HashMap::with_capacity(symbols.len());
        for (i, &c) in symbols.iter().enumerate() {
            if ordinals.insert(c, i as u8).is_some() {
                return Err(KernelError::InvalidParameter(format!(
                    "duplicate symbol {:?} in alphabet",
                    c
                )));
            }
        }

        Ok(Self { symbols, ordinals })
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// An alphabet is never empty, but clippy expects the pair
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Symbols in enumeration order
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// The symbol at a given ordinal
    ///
    /// # Panics
    /// Panics if `ordinal >= len()`.
    pub fn symbol(&self, ordinal: u8) -> char {
        self.symbols[ordinal as usize]
    }

    /// Position of a symbol in the enumeration order, if present
    pub fn ordinal_of(&self, symbol: char) -> Option<u8> {
        self.ordinals.get(&symbol).copied()
    }

    /// Strip every character not in the alphabet, preserving order
    ///
    /// The empty string is a valid result.
    pub fn filter(&self, raw: &str) -> String {
        raw.chars().filter(|c| self.ordinals.contains_key(c)).collect()
    }

    /// Encode an already-filtered string as symbol ordinals
    pub(crate) fn encode(&self, normalized: &str) -> Vec<u8> {
        normalized.chars().filter_map(|c| self.ordinal_of(c)).collect()
    }
}
