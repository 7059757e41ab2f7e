use std::fs;

use tempfile::TempDir;
use treemaker::config::{get_config, load_config, ConfigOverrides};
use treemaker::constants::CONFIG_FILES;
use treemaker::error::Error;
use treemaker::lexer::LexerConfig;

#[test]
fn test_defaults_without_config_file() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(load_config(temp_dir.path(), &CONFIG_FILES).unwrap(), None);

    let config = get_config(temp_dir.path(), None, &ConfigOverrides::default()).unwrap();
    assert_eq!(config, LexerConfig::default());
}

#[test]
fn test_config_file_lookup_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("treemaker.yaml"), "tab_width: 3\n").unwrap();
    fs::write(temp_dir.path().join("treemaker.json"), r#"{"tab_width": 2}"#).unwrap();

    let config = get_config(temp_dir.path(), None, &ConfigOverrides::default()).unwrap();
    assert_eq!(config.tab_width, 2);
}

#[test]
fn test_overrides_win_over_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("treemaker.yml"),
        "tab_width: 2\nstop_on_first_error: true\nemit_blank_newlines: true\n",
    )
    .unwrap();

    let overrides = ConfigOverrides {
        tab_width: Some(8),
        collect_errors: true,
        no_blank_newlines: true,
    };
    let config = get_config(temp_dir.path(), None, &overrides).unwrap();
    assert_eq!(config.tab_width, 8);
    assert!(!config.stop_on_first_error);
    assert!(!config.emit_blank_newlines);
}

#[test]
fn test_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.yml");
    fs::write(&path, "emit_blank_newlines: false\n").unwrap();

    let config = get_config(temp_dir.path(), Some(&path), &ConfigOverrides::default()).unwrap();
    assert!(!config.emit_blank_newlines);
    assert_eq!(config.tab_width, 4);

    let missing = temp_dir.path().join("missing.yml");
    let result = get_config(temp_dir.path(), Some(&missing), &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("treemaker.json"), "tab_width: [oops\n").unwrap();

    let result = get_config(temp_dir.path(), None, &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::ConfigError(_))));
}
