//! Excel formula tokenizer.
//!
//! Splits a formula such as `=SUM(A1:B2)*2` into typed tokens. The scheme is
//! the classic one used by most spreadsheet tooling: operands carry a subtype
//! (text, number, logical, error, range), functions and parentheses are
//! open/close pairs, and `+`/`-` are told apart as prefix or infix by the
//! token that precedes them.

use std::fmt;

const ERROR_CODES: &[&str] = &[
    "#NULL!",
    "#DIV/0!",
    "#VALUE!",
    "#REF!",
    "#NAME?",
    "#NUM!",
    "#N/A",
    "#GETTING_DATA",
];

fn is_token_ender(b: u8) -> bool {
    matches!(
        b,
        b',' | b';' | b'}' | b')' | b' ' | b'+' | b'-' | b'*' | b'/' | b'^' | b'&' | b'=' | b'>'
            | b'<' | b'%'
    )
}

/// Why a formula could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at byte {pos})")]
pub struct TokenizeError {
    pub message: String,
    pub pos: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, pos: usize) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Whole cell text when it does not start with `=`
    Literal,
    Operand,
    Func,
    Array,
    Paren,
    Sep,
    OpPrefix,
    OpInfix,
    OpPostfix,
    Whitespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSubKind {
    None,
    Text,
    Number,
    Logical,
    Error,
    Range,
    Open,
    Close,
    Arg,
    Row,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub subkind: TokenSubKind,
}

impl Token {
    fn new(value: &str, kind: TokenKind, subkind: TokenSubKind) -> Self {
        Self {
            value: value.to_string(),
            kind,
            subkind,
        }
    }

    /// Operand whose subtype is inferred from its text
    fn operand(value: &str) -> Self {
        let subkind = if value.starts_with('"') {
            TokenSubKind::Text
        } else if value.starts_with('#') {
            TokenSubKind::Error
        } else if value == "TRUE" || value == "FALSE" {
            TokenSubKind::Logical
        } else if value.parse::<f64>().is_ok() {
            TokenSubKind::Number
        } else {
            TokenSubKind::Range
        };
        Self::new(value, TokenKind::Operand, subkind)
    }

    pub fn is_range(&self) -> bool {
        self.kind == TokenKind::Operand && self.subkind == TokenSubKind::Range
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:?} {:?} {}>", self.kind, self.subkind, self.value)
    }
}

/// Tokenize a formula. Text without a leading `=` is a single literal token.
pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokenizer = Tokenizer {
        src: formula,
        bytes: formula.as_bytes(),
        items: Vec::with_capacity(formula.len() / 2),
        openers: Vec::new(),
        offset: 0,
        start: 0,
        end: 0,
    };
    tokenizer.run()?;
    Ok(tokenizer.items)
}

struct Tokenizer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    items: Vec<Token>,
    /// Kind of each currently open `(`/`{`/`FUNC(`
    openers: Vec<TokenKind>,
    offset: usize,
    /// Pending operand spans `start..end`
    start: usize,
    end: usize,
}

impl Tokenizer<'_> {
    fn run(&mut self) -> Result<(), TokenizeError> {
        if self.src.is_empty() {
            return Ok(());
        }
        if self.byte_at(0) != Some(b'=') {
            self.items
                .push(Token::new(self.src, TokenKind::Literal, TokenSubKind::None));
            return Ok(());
        }

        self.offset = 1;
        self.reset_pending();

        while let Some(b) = self.byte_at(self.offset) {
            if (b == b'+' || b == b'-') && self.pending_is_exponent_base() {
                self.offset += 1;
                self.end = self.offset;
                continue;
            }

            if is_token_ender(b) && self.has_pending() {
                self.flush_pending();
            }

            match b {
                b'"' | b'\'' => self.string(b)?,
                b'[' => self.brackets()?,
                b'#' => self.error_literal()?,
                b' ' | b'\n' => self.whitespace(),
                b'+' | b'-' | b'*' | b'/' | b'^' | b'&' | b'=' | b'>' | b'<' | b'%' => {
                    self.operator(b);
                }
                b'(' | b'{' => self.opener(b),
                b')' | b'}' => self.closer(b)?,
                b',' | b';' => self.separator(b),
                _ => {
                    if !self.has_pending() {
                        self.reset_pending();
                    }
                    self.offset += 1;
                    self.end = self.offset;
                }
            }
        }

        self.flush_pending();

        if !self.openers.is_empty() {
            return Err(TokenizeError::new(
                "unmatched opening parenthesis or brace",
                self.offset,
            ));
        }
        Ok(())
    }

    fn byte_at(&self, idx: usize) -> Option<u8> {
        self.bytes.get(idx).copied()
    }

    fn slice(&self, from: usize, to: usize) -> &str {
        self.src.get(from..to).unwrap_or_default()
    }

    fn has_pending(&self) -> bool {
        self.end > self.start
    }

    fn reset_pending(&mut self) {
        self.start = self.offset;
        self.end = self.offset;
    }

    fn flush_pending(&mut self) {
        if self.has_pending() {
            let token = Token::operand(self.slice(self.start, self.end));
            self.items.push(token);
        }
        self.reset_pending();
    }

    /// Pending text like `1.5E` whose sign belongs to the number
    fn pending_is_exponent_base(&self) -> bool {
        let Some(pending) = self.bytes.get(self.start..self.end) else {
            return false;
        };
        let [first, middle @ .., last] = pending else {
            return false;
        };
        if !first.is_ascii_digit() || !matches!(last, b'E' | b'e') {
            return false;
        }
        let mut dot_seen = false;
        for b in middle {
            match b {
                b'0'..=b'9' => {}
                b'.' if !dot_seen => dot_seen = true,
                _ => return false,
            }
        }
        true
    }

    /// `"text"` becomes a text operand; `'quoted sheet'` joins the pending operand.
    fn string(&mut self, delim: u8) -> Result<(), TokenizeError> {
        let dollar_prefix = delim == b'\''
            && self.end == self.start + 1
            && self.byte_at(self.start) == Some(b'$');

        if !dollar_prefix && self.has_pending() {
            let joins_range = self.end > 0 && self.byte_at(self.end - 1) == Some(b':');
            if !joins_range {
                self.flush_pending();
            }
        }

        let string_start = if delim == b'\'' && self.has_pending() {
            self.start
        } else {
            self.offset
        };
        self.offset += 1;

        while let Some(b) = self.byte_at(self.offset) {
            self.offset += 1;
            if b != delim {
                continue;
            }
            if self.byte_at(self.offset) == Some(delim) {
                // Doubled delimiter is an escaped quote
                self.offset += 1;
                continue;
            }
            if delim == b'"' {
                let token = Token::operand(self.slice(string_start, self.offset));
                self.items.push(token);
                self.reset_pending();
            } else {
                self.start = string_start;
                self.end = self.offset;
            }
            return Ok(());
        }

        Err(TokenizeError::new("unterminated string", self.offset))
    }

    /// Bracketed text (`Table[Column]`, `[1]Sheet1!A1`) stays inside the operand
    fn brackets(&mut self) -> Result<(), TokenizeError> {
        if !self.has_pending() {
            self.reset_pending();
        }
        let mut depth = 1usize;
        self.offset += 1;

        while let Some(b) = self.byte_at(self.offset) {
            self.offset += 1;
            match b {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        self.end = self.offset;
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        Err(TokenizeError::new("unmatched '['", self.offset))
    }

    fn error_literal(&mut self) -> Result<(), TokenizeError> {
        // `Sheet1!#REF!` keeps its sheet prefix
        if self.has_pending() && self.byte_at(self.end.saturating_sub(1)) != Some(b'!') {
            self.flush_pending();
        }
        let literal_start = if self.has_pending() {
            self.start
        } else {
            self.offset
        };

        let rest = self.bytes.get(self.offset..).unwrap_or_default();
        let Some(code) = ERROR_CODES
            .iter()
            .find(|code| rest.starts_with(code.as_bytes()))
        else {
            return Err(TokenizeError::new("invalid error literal", self.offset));
        };

        let literal_end = self.offset + code.len();
        let token = Token::operand(self.slice(literal_start, literal_end));
        self.items.push(token);
        self.offset = literal_end;
        self.reset_pending();
        Ok(())
    }

    fn whitespace(&mut self) {
        self.flush_pending();
        let from = self.offset;
        while matches!(self.byte_at(self.offset), Some(b' ' | b'\n')) {
            self.offset += 1;
        }
        let token = Token::new(
            self.slice(from, self.offset),
            TokenKind::Whitespace,
            TokenSubKind::None,
        );
        self.items.push(token);
        self.reset_pending();
    }

    fn operator(&mut self, b: u8) {
        self.flush_pending();

        let two = self.bytes.get(self.offset..self.offset + 2);
        if matches!(two, Some(b">=" | b"<=" | b"<>")) {
            let token = Token::new(
                self.slice(self.offset, self.offset + 2),
                TokenKind::OpInfix,
                TokenSubKind::None,
            );
            self.items.push(token);
            self.offset += 2;
            self.reset_pending();
            return;
        }

        let kind = match b {
            b'%' => TokenKind::OpPostfix,
            b'+' | b'-' => {
                let prev = self
                    .items
                    .iter()
                    .rev()
                    .find(|t| t.kind != TokenKind::Whitespace);
                match prev {
                    Some(t)
                        if t.subkind == TokenSubKind::Close
                            || t.kind == TokenKind::OpPostfix
                            || t.kind == TokenKind::Operand =>
                    {
                        TokenKind::OpInfix
                    }
                    _ => TokenKind::OpPrefix,
                }
            }
            _ => TokenKind::OpInfix,
        };

        let token = Token::new(
            self.slice(self.offset, self.offset + 1),
            kind,
            TokenSubKind::None,
        );
        self.items.push(token);
        self.offset += 1;
        self.reset_pending();
    }

    fn opener(&mut self, b: u8) {
        let token = if b == b'{' {
            self.flush_pending();
            Token::new("{", TokenKind::Array, TokenSubKind::Open)
        } else if self.has_pending() {
            // Pending name followed by `(` is a function call
            Token::new(
                self.slice(self.start, self.offset + 1),
                TokenKind::Func,
                TokenSubKind::Open,
            )
        } else {
            Token::new("(", TokenKind::Paren, TokenSubKind::Open)
        };

        self.openers.push(token.kind);
        self.items.push(token);
        self.offset += 1;
        self.reset_pending();
    }

    fn closer(&mut self, b: u8) -> Result<(), TokenizeError> {
        self.flush_pending();

        let Some(open_kind) = self.openers.pop() else {
            return Err(TokenizeError::new("closer without opener", self.offset));
        };
        let expected = if open_kind == TokenKind::Array {
            b'}'
        } else {
            b')'
        };
        if b != expected {
            return Err(TokenizeError::new("mismatched ( and { pair", self.offset));
        }

        let value = if b == b'}' { "}" } else { ")" };
        self.items
            .push(Token::new(value, open_kind, TokenSubKind::Close));
        self.offset += 1;
        self.reset_pending();
        Ok(())
    }

    fn separator(&mut self, b: u8) {
        self.flush_pending();

        let (kind, subkind) = if b == b';' {
            (TokenKind::Sep, TokenSubKind::Row)
        } else if matches!(
            self.openers.last(),
            Some(TokenKind::Func | TokenKind::Array)
        ) {
            (TokenKind::Sep, TokenSubKind::Arg)
        } else {
            // Union operator, as in `(A1,B1)`
            (TokenKind::OpInfix, TokenSubKind::None)
        };

        let value = if b == b';' { ";" } else { "," };
        self.items.push(Token::new(value, kind, subkind));
        self.offset += 1;
        self.reset_pending();
    }
}
