//! Folds the lexer's token stream into a [`Tree`].
//!
//! The parser keeps one slot per depth holding the node most recently
//! attached at that depth, mirroring the lexer's indentation stack: `INDENT`
//! and `DEDENT` move the current depth, and each `NAME` becomes a child of the
//! node recorded one level up.
//!
//! Structural problems are recovered from rather than fatal. They are returned
//! as [`Violation`]s next to the tree:
//!
//! - a second top-level name is ignored together with everything nested under it;
//! - a name whose direct parent slot is empty attaches to the nearest recorded
//!   ancestor;
//! - a `DEDENT` at depth zero is clamped.

use std::fmt;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::lexer::{tokenize, LexerConfig};
use crate::token::{Token, TokenKind};
use crate::tree::{AttachError, NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A top-level name after the root was already established
    SecondRoot,
    /// A name with no recorded ancestor once a root exists
    Orphaned,
    /// A name attached to a shallower ancestor because its direct parent is missing
    MissingAncestor,
    /// A `DEDENT` arrived at depth zero
    DepthUnderflow,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ViolationKind::SecondRoot => "second top-level entry ignored, a template has one root",
            ViolationKind::Orphaned => "entry has no parent and was ignored",
            ViolationKind::MissingAncestor => "parent is missing, attached to nearest ancestor",
            ViolationKind::DepthUnderflow => "dedent below top level clamped",
        };
        f.write_str(text)
    }
}

/// A structural problem the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub line: usize,
    pub column: usize,
    pub name: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " ('{}')", name)?;
        }
        Ok(())
    }
}

/// Result of a parse: the tree plus every recovered violation.
#[derive(Debug)]
pub struct ParseOutput {
    pub tree: Tree,
    pub violations: Vec<Violation>,
}

pub struct Parser {
    tree: Tree,
    levels: Vec<Option<NodeId>>,
    depth: usize,
    violations: Vec<Violation>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            levels: vec![None],
            depth: 0,
            violations: Vec::new(),
        }
    }

    /// Consumes `tokens` up to the first `EOF`.
    ///
    /// # Errors
    /// * `Error::Allocation` if the level stack or the node arena cannot grow
    pub fn parse(mut self, tokens: Vec<Token>) -> Result<ParseOutput> {
        for token in tokens {
            match token.kind {
                TokenKind::Indent => self.indent()?,
                TokenKind::Dedent => self.dedent(&token),
                TokenKind::Name => self.name(token)?,
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Comment => {}
            }
        }

        debug!(
            "parsed {} node(s) with {} violation(s)",
            self.tree.len(),
            self.violations.len()
        );
        Ok(ParseOutput {
            tree: self.tree,
            violations: self.violations,
        })
    }

    fn indent(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth >= self.levels.len() {
            self.levels.try_reserve(1).map_err(|e| {
                Error::Allocation(format!("growing the level stack to {}: {}", self.depth, e))
            })?;
            self.levels.resize(self.depth + 1, None);
        }
        Ok(())
    }

    /// Deeper slots are kept: several dedents may arrive before the name that
    /// settles the ancestry.
    fn dedent(&mut self, token: &Token) {
        if self.depth == 0 {
            self.violation(ViolationKind::DepthUnderflow, token, None);
            return;
        }
        self.depth -= 1;
    }

    fn name(&mut self, token: Token) -> Result<()> {
        let text = token.text.as_deref().unwrap_or_default();
        if text.is_empty() {
            debug!("{}:{}: skipping empty name", token.line, token.column);
            return Ok(());
        }

        let attached = if self.depth == 0 {
            self.tree.add_root(text)
        } else {
            match self.ancestor() {
                Some((parent, direct)) => {
                    if !direct {
                        self.violation(ViolationKind::MissingAncestor, &token, Some(text));
                    }
                    self.tree.attach_child(Some(parent), text)
                }
                None => self.tree.attach_child(None, text),
            }
        };

        let node = match attached {
            Ok(node) => node,
            Err(AttachError::RootExists(_)) => {
                let kind = if self.depth == 0 {
                    ViolationKind::SecondRoot
                } else {
                    ViolationKind::Orphaned
                };
                self.violation(kind, &token, Some(text));
                self.clear_from(self.depth);
                return Ok(());
            }
            Err(AttachError::EmptyName) => return Ok(()),
            Err(AttachError::Allocation(e)) => {
                return Err(Error::Allocation(format!("attaching '{}': {}", text, e)));
            }
        };

        if token.is_directory {
            self.tree.mark_directory(node);
        }
        self.levels[self.depth] = Some(node);
        self.clear_from(self.depth + 1);
        Ok(())
    }

    /// Nearest recorded ancestor of the current depth, and whether it is the
    /// direct parent slot.
    fn ancestor(&self) -> Option<(NodeId, bool)> {
        self.levels[..self.depth]
            .iter()
            .rev()
            .enumerate()
            .find_map(|(distance, slot)| slot.map(|id| (id, distance == 0)))
    }

    fn clear_from(&mut self, depth: usize) {
        for slot in self.levels.iter_mut().skip(depth) {
            *slot = None;
        }
    }

    fn violation(&mut self, kind: ViolationKind, token: &Token, name: Option<&str>) {
        let violation = Violation {
            kind,
            line: token.line,
            column: token.column,
            name: name.map(str::to_string),
        };
        warn!("{}", violation);
        self.violations.push(violation);
    }
}

/// Parses an already lexed token stream.
pub fn parse(tokens: Vec<Token>) -> Result<ParseOutput> {
    Parser::new().parse(tokens)
}

/// Lexes and parses a template, refusing to parse if the lexer reported errors.
///
/// # Errors
/// * `Error::LexError` with every lexer diagnostic for `file`
/// * `Error::Allocation` if the parser cannot grow its storage
pub fn parse_source(file: &str, source: &[u8], config: &LexerConfig) -> Result<ParseOutput> {
    let (tokens, errors) = tokenize(source, config);
    if !errors.is_empty() {
        return Err(Error::LexError {
            file: file.to_string(),
            errors,
        });
    }
    parse(tokens)
}
