//! Character to dot/dash pattern table
//!
//! Covers A-Z (lower case folds onto upper case), 0-9 and the usual ITU
//! punctuation. Lookups in both directions go through maps built once on
//! first use. No two characters share a pattern, so reverse lookup is
//! unambiguous.

use crate::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// One keyed symbol of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    pub fn notation(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }
}

/// Longest pattern in the table (`$` is `...-..-`)
pub const MAX_PATTERN_LEN: usize = 7;

/// Fixed sequence of dots and dashes for one character
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    symbols: [Symbol; MAX_PATTERN_LEN],
    len: u8,
}

impl Pattern {
    /// Build from symbols; `None` if empty or longer than any table entry
    pub fn from_symbols(symbols: &[Symbol]) -> Option<Self> {
        if symbols.is_empty() || symbols.len() > MAX_PATTERN_LEN {
            return None;
        }
        let mut buf = [Symbol::Dot; MAX_PATTERN_LEN];
        buf[..symbols.len()].copy_from_slice(symbols);
        Some(Self {
            symbols: buf,
            len: symbols.len() as u8,
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Compile-time pattern from dot/dash notation
const fn p(notation: &str) -> Pattern {
    let bytes = notation.as_bytes();
    assert!(!bytes.is_empty() && bytes.len() <= MAX_PATTERN_LEN);
    let mut symbols = [Symbol::Dot; MAX_PATTERN_LEN];
    let mut i = 0;
    while i < bytes.len() {
        symbols[i] = match bytes[i] {
            b'.' => Symbol::Dot,
            b'-' => Symbol::Dash,
            _ => panic!("pattern notation uses only '.' and '-'"),
        };
        i += 1;
    }
    Pattern {
        symbols,
        len: bytes.len() as u8,
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.symbols() {
            write!(f, "{}", symbol.notation())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({})", self)
    }
}

impl FromStr for Pattern {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodecError::InvalidPattern {
            pattern: s.to_string(),
        };
        let symbols = s
            .chars()
            .map(|c| match c {
                '.' => Ok(Symbol::Dot),
                '-' => Ok(Symbol::Dash),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()?;
        Pattern::from_symbols(&symbols).ok_or_else(invalid)
    }
}

/// Canonical table. Lower-case letters alias their upper-case entries.
const TABLE: &[(char, Pattern)] = &[
    ('A', p(".-")),
    ('B', p("-...")),
    ('C', p("-.-.")),
    ('D', p("-..")),
    ('E', p(".")),
    ('F', p("..-.")),
    ('G', p("--.")),
    ('H', p("....")),
    ('I', p("..")),
    ('J', p(".---")),
    ('K', p("-.-")),
    ('L', p(".-..")),
    ('M', p("--")),
    ('N', p("-.")),
    ('O', p("---")),
    ('P', p(".--.")),
    ('Q', p("--.-")),
    ('R', p(".-.")),
    ('S', p("...")),
    ('T', p("-")),
    ('U', p("..-")),
    ('V', p("...-")),
    ('W', p(".--")),
    ('X', p("-..-")),
    ('Y', p("-.--")),
    ('Z', p("--..")),
    ('0', p("-----")),
    ('1', p(".----")),
    ('2', p("..---")),
    ('3', p("...--")),
    ('4', p("....-")),
    ('5', p(".....")),
    ('6', p("-....")),
    ('7', p("--...")),
    ('8', p("---..")),
    ('9', p("----.")),
    ('.', p(".-.-.-")),
    (',', p("--..--")),
    ('?', p("..--..")),
    ('\'', p(".----.")),
    ('!', p("-.-.--")),
    ('/', p("-..-.")),
    ('(', p("-.--.")),
    (')', p("-.--.-")),
    ('&', p(".-...")),
    (':', p("---...")),
    (';', p("-.-.-.")),
    ('=', p("-...-")),
    ('+', p(".-.-.")),
    ('-', p("-....-")),
    ('_', p("..--.-")),
    ('"', p(".-..-.")),
    ('$', p("...-..-")),
    ('@', p(".--.-.")),
];

fn forward() -> &'static HashMap<char, Pattern> {
    static FORWARD: OnceLock<HashMap<char, Pattern>> = OnceLock::new();
    FORWARD.get_or_init(|| TABLE.iter().copied().collect())
}

fn reverse() -> &'static HashMap<Pattern, char> {
    static REVERSE: OnceLock<HashMap<Pattern, char>> = OnceLock::new();
    REVERSE.get_or_init(|| TABLE.iter().map(|&(ch, pattern)| (pattern, ch)).collect())
}

/// Pattern for a character, or `None` if it has no Morse representation
pub fn lookup(ch: char) -> Option<Pattern> {
    forward().get(&ch.to_ascii_uppercase()).copied()
}

/// Character for a symbol sequence, or `None` if nothing matches
pub fn reverse_lookup(symbols: &[Symbol]) -> Option<char> {
    let pattern = Pattern::from_symbols(symbols)?;
    reverse().get(&pattern).copied()
}

/// Canonical characters of the table, in table order
pub fn supported_characters() -> impl Iterator<Item = char> {
    TABLE.iter().map(|&(ch, _)| ch)
}
