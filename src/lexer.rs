//! Indentation-sensitive lexer for tree templates.
//!
//! The lexer works over a fully read byte buffer and produces a stream of
//! [`Token`]s. Leading whitespace is measured as a width (spaces count one,
//! tabs count `tab_width`) and compared against a stack of previously seen
//! widths, the same way block-structured languages without braces do it:
//! a wider line opens one `INDENT`, a narrower one closes one `DEDENT` per
//! popped width.
//!
//! Errors never abort lexing. They are collected as [`LexError`] values and,
//! when `stop_on_first_error` is set, the first one latches the lexer so every
//! following call yields `EOF`.

use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace};
use serde::Deserialize;

use crate::constants::DEFAULT_TAB_WIDTH;
use crate::token::{Token, TokenKind};

/// Lexer settings, loadable from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexerConfig {
    /// Width a tab contributes to the indentation of a line
    pub tab_width: usize,
    /// Emit a `NEWLINE` token for blank and comment-only lines
    pub emit_blank_newlines: bool,
    /// Latch to `EOF` after the first error instead of collecting all of them
    pub stop_on_first_error: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            emit_blank_newlines: true,
            stop_on_first_error: true,
        }
    }
}

impl LexerConfig {
    /// Configuration that keeps lexing past errors, used by the token dump.
    pub fn collect_all() -> Self {
        Self {
            stop_on_first_error: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A byte outside the template grammar
    UnexpectedChar,
    /// A dedent to a width that was never pushed
    BadIndent,
    /// A control character glued to a name
    ControlInName,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LexErrorKind::UnexpectedChar => "UNEXPECTED_CHAR",
            LexErrorKind::BadIndent => "BAD_INDENT",
            LexErrorKind::ControlInName => "CONTROL_IN_NAME",
        };
        f.write_str(name)
    }
}

/// A lexer diagnostic pointing at a 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message} ({kind})")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl LexError {
    /// Formats the error the way compilers do, prefixed by the file name.
    pub fn report(&self, file: &str) -> String {
        format!(
            "{}:{}:{}: error: {} ({})",
            file, self.line, self.column, self.message, self.kind
        )
    }
}

/// Stack of indentation widths, bottom to top strictly increasing.
///
/// The sentinel width `0` is pushed on creation and can never be popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentStack {
    widths: Vec<usize>,
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentStack {
    pub fn new() -> Self {
        Self { widths: vec![0] }
    }

    pub fn top(&self) -> usize {
        self.widths.last().copied().unwrap_or(0)
    }

    /// Pushes a width wider than the current top.
    pub fn push(&mut self, width: usize) {
        debug_assert!(width > self.top(), "indent widths must strictly increase");
        self.widths.push(width);
    }

    /// Pops the top width, refusing to pop the sentinel.
    pub fn pop(&mut self) -> Option<usize> {
        if self.widths.len() > 1 {
            self.widths.pop()
        } else {
            None
        }
    }

    /// Number of open levels above the sentinel.
    pub fn depth(&self) -> usize {
        self.widths.len() - 1
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }
}

/// Streaming lexer state over one template buffer.
pub struct Lexer<'src> {
    src: &'src [u8],
    pos: usize,
    line: usize,
    column: usize,
    at_line_start: bool,
    /// The current physical line holds nothing but whitespace or a comment
    blank_line: bool,
    indents: IndentStack,
    pending: VecDeque<Token>,
    errors: Vec<LexError>,
    fatal: bool,
    finished: bool,
    config: LexerConfig,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src [u8], config: LexerConfig) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            blank_line: false,
            indents: IndentStack::new(),
            pending: VecDeque::with_capacity(4),
            errors: Vec::new(),
            fatal: false,
            finished: false,
            config,
        }
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    /// Current indentation widths, sentinel included.
    pub fn indent_widths(&self) -> &[usize] {
        self.indents.widths()
    }

    /// Whether the stop-on-first-error latch has been set.
    pub fn is_latched(&self) -> bool {
        self.fatal
    }

    /// Returns the next token. Once `EOF` has been returned, keeps returning `EOF`.
    pub fn next_token(&mut self) -> Token {
        if self.fatal {
            return self.eof();
        }

        let token = self.scan();
        if self.fatal && !token.is_eof() {
            trace!("lexer latched, dropping {} and forcing EOF", token);
            return self.eof();
        }
        token
    }

    fn eof(&self) -> Token {
        Token::structural(TokenKind::Eof, self.line, self.column)
    }

    fn scan(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }

            if self.pos >= self.src.len() {
                if self.indents.pop().is_some() {
                    return Token::structural(TokenKind::Dedent, self.line, self.column);
                }
                return self.eof();
            }

            if self.at_line_start {
                self.at_line_start = false;
                self.start_line();
                continue;
            }

            let (line, column) = (self.line, self.column);
            match self.src[self.pos] {
                b'\n' => {
                    self.bump();
                    if self.blank_line && !self.config.emit_blank_newlines {
                        continue;
                    }
                    return Token::structural(TokenKind::Newline, line, column);
                }
                byte if is_inline_space(byte) => {
                    self.bump();
                }
                b'#' => return self.comment(),
                byte if is_name_byte(byte) => return self.name(),
                byte => {
                    self.unexpected(byte);
                    // An empty name keeps the stream well formed for the parser.
                    return Token::name("", false, line, column);
                }
            }
        }
    }

    /// Consumes the indentation of a new physical line and queues the
    /// structural tokens it implies.
    fn start_line(&mut self) {
        let (width, len) = measure_indent(&self.src[self.pos..], self.config.tab_width);
        for _ in 0..len {
            self.bump();
        }

        let first = self.src[self.pos..]
            .iter()
            .copied()
            .find(|&b| !is_inline_space(b));
        self.blank_line = matches!(first, None | Some(b'\n') | Some(b'#'));
        if self.blank_line {
            trace!("line {} is blank or comment-only", self.line);
            return;
        }

        self.align(width);
    }

    fn align(&mut self, width: usize) {
        if width > self.indents.top() {
            self.indents.push(width);
            self.pending
                .push_back(Token::structural(TokenKind::Indent, self.line, 1));
            return;
        }

        // Report the widths that were open before this line closed any of them.
        let message = if self.indents.widths().contains(&width) {
            None
        } else {
            Some(format!(
                "inconsistent indentation: width {} matches none of {:?}",
                width,
                self.indents.widths()
            ))
        };

        while self.indents.top() > width {
            self.indents.pop();
            self.pending
                .push_back(Token::structural(TokenKind::Dedent, self.line, 1));
        }

        if let Some(message) = message {
            self.error(LexErrorKind::BadIndent, self.line, self.column, message);
        }
    }

    fn name(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();

        let mut is_directory = false;
        match self.peek() {
            Some(byte) if is_separator(byte) => {
                self.bump();
                is_directory = true;
            }
            Some(byte) if is_control(byte) => {
                let message = format!("control character 0x{:02x} in name '{}'", byte, text);
                self.error(LexErrorKind::ControlInName, self.line, self.column, message);
                self.bump();
            }
            _ => {}
        }

        Token::name(text, is_directory, line, column)
    }

    fn comment(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        self.bump();
        let start = self.pos;
        while self.peek().is_some_and(|b| b != b'\n') {
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]);
        Token::comment(text.trim_end_matches('\r'), line, column)
    }

    fn unexpected(&mut self, byte: u8) {
        let (line, column) = (self.line, self.column);
        let width = utf8_width(byte).min(self.src.len() - self.pos);
        let message = match std::str::from_utf8(&self.src[self.pos..self.pos + width]) {
            Ok(ch) if width > 1 || byte.is_ascii_graphic() => {
                for _ in 1..width {
                    self.bump();
                }
                format!("unexpected character '{}'", ch)
            }
            _ => format!("unexpected byte 0x{:02x}", byte),
        };
        self.bump();
        self.error(LexErrorKind::UnexpectedChar, line, column, message);
    }

    fn error(&mut self, kind: LexErrorKind, line: usize, column: usize, message: String) {
        debug!("{}:{}: {} ({})", line, column, message, kind);
        self.errors.push(LexError {
            kind,
            line,
            column,
            message,
        });
        if self.config.stop_on_first_error {
            self.fatal = true;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = *self.src.get(self.pos)?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }
        Some(byte)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to and including the first `EOF`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.is_eof();
        Some(token)
    }
}

/// Lexes a whole buffer. The returned tokens always end with `EOF`.
pub fn tokenize(source: &[u8], config: &LexerConfig) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(source, config.clone());
    let tokens: Vec<Token> = lexer.by_ref().collect();
    debug!(
        "lexed {} token(s), {} error(s)",
        tokens.len(),
        lexer.errors().len()
    );
    (tokens, lexer.into_errors())
}

/// Returns the indentation width of `line` and the number of bytes it spans.
fn measure_indent(line: &[u8], tab_width: usize) -> (usize, usize) {
    let mut width = 0;
    let mut len = 0;
    for &byte in line {
        match byte {
            b' ' => width += 1,
            b'\t' => width += tab_width,
            b'\r' => {}
            _ => break,
        }
        len += 1;
    }
    (width, len)
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.' | b'+' | b'@')
}

fn is_inline_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

fn is_separator(byte: u8) -> bool {
    byte.is_ascii() && std::path::is_separator(byte as char)
}

fn is_control(byte: u8) -> bool {
    byte.is_ascii_control() && byte != b'\n' && !is_inline_space(byte)
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}
