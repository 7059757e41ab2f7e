//! Tokens produced by the template lexer.

use serde::Serialize;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    Indent,
    Dedent,
    Newline,
    Name,
    Comment,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Name => "NAME",
            TokenKind::Comment => "COMMENT",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A single token with its 1-based source position.
///
/// `text` is only set for `Name` and `Comment`. `is_directory` records that a
/// `Name` was immediately followed by a path separator, which the lexer
/// consumes but keeps out of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_directory: bool,
}

impl Token {
    /// Creates a structural token (everything except `Name` and `Comment`).
    pub fn structural(kind: TokenKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: None,
            line,
            column,
            is_directory: false,
        }
    }

    pub fn name(text: impl Into<String>, is_directory: bool, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Name,
            text: Some(text.into()),
            line,
            column,
            is_directory,
        }
    }

    pub fn comment(text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Comment,
            text: Some(text.into()),
            line,
            column,
            is_directory: false,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.kind)?;
        if let Some(text) = &self.text {
            write!(f, " {:?}", text)?;
        }
        if self.is_directory {
            write!(f, " (dir)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(
            Token::structural(TokenKind::Indent, 2, 1).to_string(),
            "2:1 INDENT"
        );
        assert_eq!(
            Token::name("src", true, 1, 1).to_string(),
            "1:1 NAME \"src\" (dir)"
        );
        assert_eq!(
            Token::comment(" note", 3, 5).to_string(),
            "3:5 COMMENT \" note\""
        );
    }

    #[test]
    fn test_token_serialization() {
        let json = serde_json::to_string(&Token::name("a", true, 1, 1)).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"NAME","text":"a","line":1,"column":1,"is_directory":true}"#
        );

        let json = serde_json::to_string(&Token::structural(TokenKind::Eof, 4, 1)).unwrap();
        assert_eq!(json, r#"{"kind":"EOF","line":4,"column":1}"#);
    }
}
