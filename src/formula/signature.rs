//! Structural formula signatures.
//!
//! Two formulas share a signature when they differ only in which cells they
//! reference and which numbers they contain: `=A1+B1` and `=C5+D9` both
//! canonicalize to `=:+:`. Signatures are numbered in first-seen order by a
//! [`SignatureTable`] the caller owns, so the numbering can be scoped to one
//! run or shared across many.

use parking_lot::Mutex;
use std::collections::HashMap;

use super::tokenizer::{tokenize, Token, TokenKind, TokenSubKind, TokenizeError};

/// A canonical formula and the id it was interned under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub canonical: String,
    pub id: u32,
}

/// Canonical form of a token stream.
///
/// Function openers and closers, parentheses and infix operators are kept
/// verbatim; references become `:` and numbers `n`; other operands (text,
/// logicals, errors) are kept. Separators, prefix/postfix operators and
/// whitespace are dropped.
pub fn canonicalize(tokens: &[Token]) -> String {
    let mut out = String::from("=");
    for token in tokens {
        match (token.kind, token.subkind) {
            (TokenKind::Operand, TokenSubKind::Range) => out.push(':'),
            (TokenKind::Operand, TokenSubKind::Number) => out.push('n'),
            (TokenKind::Operand, _)
            | (TokenKind::Func | TokenKind::Paren | TokenKind::OpInfix, _) => {
                out.push_str(&token.value);
            }
            _ => {}
        }
    }
    out
}

/// Canonical string → sequential id, safe to share between threads.
#[derive(Debug, Default)]
pub struct SignatureTable {
    ids: Mutex<HashMap<String, u32>>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `canonical`, assigning the next id on first sight.
    ///
    /// Lookup and insert happen under one lock, so concurrent callers never
    /// hand out the same id twice.
    pub fn intern(&self, canonical: String) -> Signature {
        let mut ids = self.ids.lock();
        let next = u32::try_from(ids.len()).unwrap_or(u32::MAX);
        let id = *ids.entry(canonical.clone()).or_insert(next);
        Signature { canonical, id }
    }

    /// Tokenize, canonicalize and intern a formula.
    pub fn signature_of(&self, formula: &str) -> Result<Signature, TokenizeError> {
        let tokens = tokenize(formula)?;
        Ok(self.intern(canonicalize(&tokens)))
    }

    pub fn get(&self, canonical: &str) -> Option<u32> {
        self.ids.lock().get(canonical).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
