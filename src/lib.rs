//! treemaker turns indentation-based tree templates into directory trees.
//! A template is lexed into INDENT/DEDENT/NAME tokens, folded into an ordered
//! tree of directory and file nodes, and replayed onto the filesystem.

/// Filesystem materializer for parsed trees
pub mod builder;

/// Command-line interface module for the treemaker application
pub mod cli;

/// Configuration handling for lexer settings
/// Supports JSON and YAML formats (treemaker.json, treemaker.yml, treemaker.yaml)
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for the treemaker application
pub mod error;

/// Indentation-sensitive template lexer
pub mod lexer;

/// Logger initialization
pub mod logger;

/// Token-to-tree parser
pub mod parser;

/// Per-file processing pipeline
pub mod processor;

/// Tokens produced by the lexer
pub mod token;

/// Arena-backed directory/file tree
pub mod tree;
