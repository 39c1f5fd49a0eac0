//! Formula analysis: tokenizing, structural signatures, reference
//! extraction and shared-formula expansion.

pub mod references;
pub mod shared;
pub mod signature;
pub mod tokenizer;

pub use references::{extract_references, References, SkippedReference};
pub use shared::{shift_formula, SharedFormulas};
pub use signature::{canonicalize, Signature, SignatureTable};
pub use tokenizer::{tokenize, Token, TokenKind, TokenSubKind, TokenizeError};
