//! Core template processing orchestration.
//! Runs one template file at a time through lexing, parsing and building,
//! and releases its tree before the next file is read.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::builder::{BuildOperation, BuildReport, Builder};
use crate::constants::TEMPLATE_EXTENSION;
use crate::error::{Error, Result};
use crate::lexer::{tokenize, LexError, LexerConfig};
use crate::parser::{parse_source, ParseOutput, Violation};
use crate::token::Token;
use crate::tree::Tree;

/// A parsed template whose operations are planned but not yet performed.
#[derive(Debug)]
pub struct PreparedTemplate {
    pub file: PathBuf,
    pub operations: Vec<BuildOperation>,
    pub violations: Vec<Violation>,
    /// The parsed tree as text, when debug output was requested
    pub preview: Option<String>,
    tree: Tree,
}

/// Outcome of processing a single template file.
#[derive(Debug)]
pub struct ProcessResult {
    pub file: PathBuf,
    /// Operations performed, or only planned in dry-run mode
    pub operations: Vec<BuildOperation>,
    /// `None` in dry-run mode
    pub report: Option<BuildReport>,
    pub violations: Vec<Violation>,
    pub preview: Option<String>,
}

pub struct Processor<'a> {
    config: &'a LexerConfig,
    builder: Builder,
    debug: bool,
    dry_run: bool,
}

impl<'a> Processor<'a> {
    pub fn new<P: AsRef<Path>>(
        config: &'a LexerConfig,
        dest: P,
        debug: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            builder: Builder::new(dest),
            debug,
            dry_run,
        }
    }

    /// Lexes, parses and plans one template file without touching the
    /// destination.
    ///
    /// # Errors
    /// * `Error::IoError` if the file cannot be read
    /// * `Error::LexError` if the lexer reported anything
    /// * `Error::EmptyTemplate` if the template describes no node
    pub fn prepare(&self, path: &Path) -> Result<PreparedTemplate> {
        let file = path.display().to_string();
        if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
            debug!(
                "'{}' does not use the .{} extension",
                file, TEMPLATE_EXTENSION
            );
        }

        let source = read_template(path)?;
        let ParseOutput { tree, violations } = parse_source(&file, &source, self.config)?;
        if tree.is_empty() {
            return Err(Error::EmptyTemplate { file });
        }

        let preview = self.debug.then(|| tree.to_string());
        let operations = self.builder.plan(&tree)?;

        Ok(PreparedTemplate {
            file: path.to_path_buf(),
            operations,
            violations,
            preview,
            tree,
        })
    }

    /// Performs the planned operations unless this is a dry run, then
    /// releases the tree whether or not building succeeded.
    ///
    /// # Errors
    /// * `Error::BuildError` if a directory or file cannot be created
    pub fn build(&self, prepared: PreparedTemplate) -> Result<ProcessResult> {
        let PreparedTemplate {
            file,
            operations,
            violations,
            preview,
            mut tree,
        } = prepared;

        let report = if self.dry_run {
            debug!("Dry run, skipping {} operation(s)", operations.len());
            None
        } else {
            Some(self.builder.execute(&operations))
        };

        let released = tree.clear();
        debug!("Released {} node(s) for {}", released, file.display());

        Ok(ProcessResult {
            file,
            operations,
            report: report.transpose()?,
            violations,
            preview,
        })
    }

    /// Prepares and builds one template file.
    pub fn process(&self, path: &Path) -> Result<ProcessResult> {
        let prepared = self.prepare(path)?;
        self.build(prepared)
    }
}

/// Token stream and diagnostics of one file, for the token dump.
#[derive(Debug)]
pub struct TokenDump {
    pub file: String,
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Tokenizes a file unconditionally, always collecting every error.
pub fn tokenize_file(path: &Path, config: &LexerConfig) -> Result<TokenDump> {
    let source = read_template(path)?;
    let config = LexerConfig {
        stop_on_first_error: false,
        ..config.clone()
    };
    let (tokens, errors) = tokenize(&source, &config);
    Ok(TokenDump {
        file: path.display().to_string(),
        tokens,
        errors,
    })
}

/// Reads the whole template into memory; the lexer works on the full buffer.
pub fn read_template<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    debug!("Reading template {}", path.display());
    Ok(fs::read(path)?)
}
