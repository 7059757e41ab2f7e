//! Common constants used throughout the treemaker application.

/// Supported configuration file names, in lookup order
pub const CONFIG_FILES: [&str; 3] = ["treemaker.json", "treemaker.yml", "treemaker.yaml"];

/// Conventional extension of tree template files
pub const TEMPLATE_EXTENSION: &str = "trm";

/// Width a tab expands to when no configuration says otherwise
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Indentation used per depth level when printing a tree
pub const PRINT_INDENT: &str = "    ";

/// Separator used to join segment names into a node's full path
pub const PATH_SEPARATOR: char = std::path::MAIN_SEPARATOR;
