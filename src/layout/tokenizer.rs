//! Interns property paths to compact integer tokens.

use std::collections::HashMap;

use crate::codec;

/// A token assigned to an interned path, with its varint encoding
/// pre-computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToken {
    id: u64,
    varint: [u8; codec::MAX_VARINT_LEN],
    varint_len: u8,
    path: String,
}

impl StringToken {
    fn new(id: u64, path: &str) -> StringToken {
        let mut varint = [0u8; codec::MAX_VARINT_LEN];
        let varint_len = codec::write_varuint(&mut varint, 0, id) as u8;
        StringToken {
            id,
            varint,
            varint_len,
            path: path.to_owned(),
        }
    }

    /// The token id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The pre-encoded LEB128 form of the id.
    #[must_use]
    pub fn varint(&self) -> &[u8] {
        &self.varint[..self.varint_len as usize]
    }

    /// The interned path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Assigns monotone integer tokens to property paths.
///
/// Token 0 is always the empty string.  The tokenizer is owned by a
/// [`Layout`](super::Layout); its count delimits the tokenized region of the
/// sparse path encoding — path values below the count refer to interned
/// entries, values at or above it carry inline UTF-8 bytes.
#[derive(Debug, PartialEq)]
pub struct StringTokenizer {
    tokens: HashMap<String, StringToken>,
    strings: Vec<String>,
    count: u64,
}

impl Default for StringTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTokenizer {
    /// Creates a tokenizer holding only the empty-string token.
    #[must_use]
    pub fn new() -> StringTokenizer {
        let mut tokens = HashMap::new();
        tokens.insert(String::new(), StringToken::new(0, ""));
        StringTokenizer {
            tokens,
            strings: vec![String::new()],
            count: 1,
        }
    }

    /// The number of unique tokens described by the encoding.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Looks up a string's corresponding token.
    #[must_use]
    pub fn try_find_token(&self, path: &str) -> Option<&StringToken> {
        self.tokens.get(path)
    }

    /// Looks up a token's corresponding string.
    #[must_use]
    pub fn try_find_string(&self, token: u64) -> Option<&str> {
        self.strings.get(token as usize).map(String::as_str)
    }

    /// Assigns a token to the string; returns the existing token if the
    /// string is already interned.
    pub fn add(&mut self, path: &str) -> &StringToken {
        if !self.tokens.contains_key(path) {
            let id = self.count;
            self.count += 1;
            self.tokens.insert(path.to_owned(), StringToken::new(id, path));
            self.strings.push(path.to_owned());
            debug_assert_eq!(self.strings.len() as u64 - 1, id);
        }
        &self.tokens[path]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_token_zero() {
        let t = StringTokenizer::new();
        assert_eq!(t.count(), 1);
        assert_eq!(t.try_find_token("").unwrap().id(), 0);
        assert_eq!(t.try_find_string(0), Some(""));
    }

    #[test]
    fn tokens_are_monotone_and_idempotent() {
        let mut t = StringTokenizer::new();
        assert_eq!(t.add("a").id(), 1);
        assert_eq!(t.add("b").id(), 2);
        assert_eq!(t.add("a").id(), 1);
        assert_eq!(t.count(), 3);
        assert_eq!(t.try_find_string(2), Some("b"));
        assert!(t.try_find_string(3).is_none());
    }

    #[test]
    fn varint_is_precomputed() {
        let mut t = StringTokenizer::new();
        for i in 0..200 {
            t.add(&format!("p{i}"));
        }
        let tok = t.try_find_token("p190").unwrap();
        assert_eq!(tok.id(), 191);
        let (decoded, len) = crate::codec::read_varuint(tok.varint(), 0);
        assert_eq!(decoded, 191);
        assert_eq!(len as usize, tok.varint().len());
    }
}
