//! Configuration handling for treemaker.
//! Lexer settings are read from the first configuration file found
//! (treemaker.json, treemaker.yml, treemaker.yaml) and can be overridden
//! from the command line.

use std::path::Path;

use log::debug;

use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::lexer::LexerConfig;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub tab_width: Option<usize>,
    pub collect_errors: bool,
    pub no_blank_newlines: bool,
}

/// Loads configuration from a directory, trying multiple file formats.
///
/// # Arguments
/// * `dir` - Directory searched for a configuration file
/// * `config_files` - Candidate file names, in lookup order
///
/// # Returns
/// * `Result<Option<String>>` - Contents of the first found file, if any
pub fn load_config<P: AsRef<Path>>(dir: P, config_files: &[&str]) -> Result<Option<String>> {
    for file in config_files {
        let config_path = dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(Some(std::fs::read_to_string(&config_path)?));
        }
    }
    debug!(
        "No configuration file found (tried: {})",
        config_files.join(", ")
    );
    Ok(None)
}

/// Parses configuration content, as JSON first and YAML otherwise.
///
/// # Errors
/// * `Error::ConfigError` if neither format accepts the content or a value is invalid
pub fn parse_config(content: &str) -> Result<LexerConfig> {
    let config: LexerConfig = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {}", e)))?,
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &LexerConfig) -> Result<()> {
    if config.tab_width == 0 {
        return Err(Error::ConfigError("tab_width must be positive".into()));
    }
    Ok(())
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))
}

/// Builds the effective lexer configuration.
///
/// An explicit `config_file` must exist; otherwise `dir` is searched for one of
/// the default file names and defaults apply when none is present.
pub fn get_config<P: AsRef<Path>>(
    dir: P,
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<LexerConfig> {
    let content = match config_file {
        Some(path) => Some(read_config_file(path)?),
        None => load_config(dir, &CONFIG_FILES)?,
    };

    let mut config = match content {
        Some(content) => parse_config(&content)?,
        None => LexerConfig::default(),
    };

    if let Some(tab_width) = overrides.tab_width {
        config.tab_width = tab_width;
    }
    if overrides.collect_errors {
        config.stop_on_first_error = false;
    }
    if overrides.no_blank_newlines {
        config.emit_blank_newlines = false;
    }
    validate(&config)?;

    debug!("Effective lexer configuration: {:?}", config);
    Ok(config)
}
